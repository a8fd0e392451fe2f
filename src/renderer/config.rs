//! Configuration for document rendering

/// Default stylesheet link for the Ubuntu web font
pub const DEFAULT_FONT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Ubuntu:wght@400;500;700&display=swap";

/// Configuration options for markup output
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Whether to wrap the widgets in the full page (head, header, footer)
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// `chrono` format string for the footer's generation date
    pub date_format: String,

    /// Web font stylesheet linked from the page head
    pub font_url: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            pretty_print: true,
            date_format: "%B %d, %Y".to_string(),
            font_url: Some(DEFAULT_FONT_URL.to_string()),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether output is a full page
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the footer date format
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Set the web font stylesheet link
    pub fn with_font_url(mut self, url: impl Into<String>) -> Self {
        self.font_url = Some(url.into());
        self
    }

    /// Do not link any web font
    pub fn without_font(mut self) -> Self {
        self.font_url = None;
        self
    }
}
