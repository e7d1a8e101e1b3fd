//! API constants and endpoint builders for the org's REST and SOAP APIs

/// API version used when the environment does not pin one
pub const DEFAULT_API_VERSION: &str = "58.0";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("force-cli/", env!("CARGO_PKG_VERSION"));

/// Standard headers
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    pub const CONTENT_TYPE_XML: &str = "text/xml; charset=UTF-8";

    /// The Metadata API ignores the action but requires the header
    pub const SOAP_ACTION: &str = "\"\"";
}

fn trim_base(instance_url: &str) -> &str {
    instance_url.trim_end_matches('/')
}

/// Metadata API SOAP endpoint
pub fn metadata_endpoint(instance_url: &str, api_version: &str) -> String {
    format!("{}/services/Soap/m/{}", trim_base(instance_url), api_version)
}

/// REST base for data calls, e.g. `https://x.my.salesforce.com/services/data/v58.0`
pub fn data_path(instance_url: &str, api_version: &str) -> String {
    format!("{}/services/data/v{}", trim_base(instance_url), api_version)
}

/// SOQL query endpoint
pub fn query_endpoint(instance_url: &str, api_version: &str) -> String {
    format!("{}/query", data_path(instance_url, api_version))
}

/// Record endpoint. `id` may be `Field:Value` to look the record up by an
/// alternate key instead of its Id.
pub fn record_endpoint(instance_url: &str, api_version: &str, object: &str, id: &str) -> String {
    let base = format!(
        "{}/sobjects/{}",
        data_path(instance_url, api_version),
        urlencoding::encode(object)
    );
    match id.split_once(':') {
        Some((field, value)) => format!(
            "{}/{}/{}",
            base,
            urlencoding::encode(field),
            urlencoding::encode(value)
        ),
        None => format!("{}/{}", base, urlencoding::encode(id)),
    }
}

/// Absolute URL for a `nextRecordsUrl` returned by a paged query
pub fn next_records_endpoint(instance_url: &str, next_records_url: &str) -> String {
    format!("{}{}", trim_base(instance_url), next_records_url)
}
