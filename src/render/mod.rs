mod container;
mod html;

pub use container::{Container, FileContainer, MemoryContainer};
pub use html::{
    escape_html, format_date, generate_article_html, safe_url, EMPTY_HTML, ERROR_HTML,
    LOADING_HTML,
};
