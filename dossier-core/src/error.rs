use thiserror::Error;

#[derive(Error, Debug)]
pub enum DossierError {
    #[error("RDAP error: {0}")]
    Rdap(String),

    #[error("WHOIS error: {0}")]
    Whois(String),

    #[error("WHOIS Parser error: {0}")]
    WhoisParse(String),

    #[error("System error: {0}")]
    System(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("DNS error: {0}")]
    Dns(String),
}

impl DossierError {
    /// The subsystem the failure originated in.
    pub fn source_tag(&self) -> &'static str {
        match self {
            DossierError::Rdap(_) => "RDAP",
            DossierError::Whois(_) => "WHOIS",
            DossierError::WhoisParse(_) => "WHOIS Parser",
            DossierError::System(_) => "System",
            DossierError::InvalidDomain(_) => "Input",
            DossierError::Dns(_) => "DNS",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DossierError::System(_))
    }
}

impl From<reqwest::Error> for DossierError {
    fn from(e: reqwest::Error) -> Self {
        DossierError::Rdap(e.to_string())
    }
}

impl From<serde_json::Error> for DossierError {
    fn from(e: serde_json::Error) -> Self {
        DossierError::Rdap(format!("invalid JSON: {}", e))
    }
}

impl From<std::io::Error> for DossierError {
    fn from(e: std::io::Error) -> Self {
        DossierError::Whois(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DossierError>;
