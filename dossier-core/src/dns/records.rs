use serde::{Deserialize, Serialize};

/// Live DNS data attached to every resolved record, whichever source won.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecords {
    /// Host addresses.
    pub a: Vec<String>,
    /// Mail exchanger host names.
    pub mx: Vec<String>,
    /// TXT strings, one per record.
    pub txt: Vec<String>,
}

impl DnsRecords {
    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.mx.is_empty() && self.txt.is_empty()
    }
}
