pub(crate) mod jsonl_logger;
pub(crate) mod logger;
pub(crate) mod styles;

pub(crate) static CHECK: &str = "✔";
pub(crate) static MARK: &str = "✘";
