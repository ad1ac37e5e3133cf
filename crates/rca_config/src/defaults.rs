// Various default functions to be used by serde

pub(crate) fn default_name() -> String {
    "rca".into()
}

pub(crate) fn default_version() -> String {
    "0.1.0".into()
}

pub(crate) fn default_thread_name() -> String {
    "rca-host".into()
}

pub(crate) fn default_application() -> String {
    "RCA Host".into()
}
