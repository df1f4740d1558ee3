use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("report template error")]
    Template(#[from] tera::Error),
    #[error("syntax highlighting error")]
    Highlight(#[from] syntect::Error),
    #[error("unknown highlighting theme '{0}'")]
    UnknownTheme(String),
    #[error("invalid SQL vocabulary")]
    Vocabulary(#[from] regex::Error),
}
