use crate::error::AppError;
use url::Url;

pub const ALLOWED_DOMAINS: [&str; 2] = ["dzen.ru", "zen.yandex.ru"];

/// Accepts `https` links on an allowed domain or one of its subdomains.
pub fn validate_task_url(raw: &str) -> Result<Url, AppError> {
    let rejected =
        || AppError::invalid_input("link must be an https URL on dzen.ru or zen.yandex.ru");

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("url is required"));
    }

    let parsed = Url::parse(trimmed).map_err(|_| rejected())?;
    if parsed.scheme() != "https" {
        return Err(rejected());
    }

    let host = parsed
        .host_str()
        .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
        .ok_or_else(rejected)?;

    if ALLOWED_DOMAINS.iter().any(|domain| host_matches(&host, domain)) {
        Ok(parsed)
    } else {
        Err(rejected())
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
