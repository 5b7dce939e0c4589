#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogParse,
    CatalogRebuild,
    CatalogValidate,
    CatalogLookup,
    DetectEncoding,
    StoreScan,
    StoreResolve,
    StoreSave,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.parse" => Command::CatalogParse,
            "catalog.rebuild" => Command::CatalogRebuild,
            "catalog.validate" => Command::CatalogValidate,
            "catalog.lookup" => Command::CatalogLookup,
            "encoding.detect" | "detect_encoding" => Command::DetectEncoding,
            "store.scan" => Command::StoreScan,
            "store.resolve" => Command::StoreResolve,
            "store.save" => Command::StoreSave,
            _ => Command::Unknown,
        }
    }
}
