#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoastResult {
    Success(String),
    Failure,
}
