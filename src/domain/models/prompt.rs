#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;

pub struct RoastPrompt {
    pub username: String,
    pub text: String,
}

impl RoastPrompt {
    pub fn new(username: &str, films: &[String]) -> RoastPrompt {
        let films = films.join(", ");
        // Kept verbatim, including the trailing space and the padded blank lines.
        let text = [
            format!("Based on this Letterboxd user's ({username}) movie ratings, please create a humorous roast of their taste in movies. "),
            "".to_string(),
            "    ".to_string(),
            format!("Their favorite movies (5 stars): {films}"),
            "Don't mention the name of the movies at all, just do a general roast of their taste in movies.".to_string(),
            "give your answer in Farsi.".to_string(),
            "be creative and funny and rude, make it hurt, at least 2 paragraphs".to_string(),
        ]
        .join("\n");

        return RoastPrompt {
            username: username.to_string(),
            text,
        };
    }
}
