//! Everything the bot says. The audience is Persian speaking, so are the replies.

pub const GREETING: &str = "من روستتون میکنم. 🎬\nیوزرنیم لترباکستونو بزنید:";
pub const EMPTY_USERNAME: &str = "یوزرنیم خالی که نمیشه";
pub const ROASTING: &str = "در حال توهین و تحقیر... 🔥";
pub const ANOTHER_ONE: &str = "یکی دیگه?  /start";
pub const NO_FILMS: &str = "فیلم میلم نداشت:";
pub const ROAST_FAILED: &str = "یه مشکلی هست قطعا";
pub const FAREWELL: &str = "بای!  /start";

pub fn searching(username: &str) -> String {
    return format!("دنبال فیلمام {username}...");
}

pub fn error(err: &anyhow::Error) -> String {
    return format!("ارور: {err}\n:");
}
