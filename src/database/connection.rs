use log::{error, warn};
use openssl::ssl::{SslConnector, SslMethod};
use postgres_openssl::MakeTlsConnector;
use tokio::time::Duration;
use url::Url;

/// How often and how patiently a database operation is retried
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub wait_between_retries: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 10,
            wait_between_retries: Duration::from_secs(5),
        }
    }
}

/// TLS connector trusting the CA in `sslrootcert_path`, peer verification on
fn build_ssl_connector(sslrootcert_path: &str) -> Result<SslConnector, String> {
    let mut builder =
        SslConnector::builder(SslMethod::tls()).map_err(|e| format!("SSL builder error: {}", e))?;

    builder
        .set_ca_file(sslrootcert_path)
        .map_err(|e| format!("Error loading CA cert: {}", e))?;

    Ok(builder.build())
}

pub fn create_ssl_connector(sslrootcert_path: &str) -> Result<MakeTlsConnector, String> {
    build_ssl_connector(sslrootcert_path).map(MakeTlsConnector::new)
}

/// Split the `sslrootcert` query parameter off a connection URL
///
/// tokio-postgres rejects the parameter, so it is removed from the URL and
/// returned separately as the CA file path.
pub fn split_sslrootcert(database_url: &str) -> Result<(String, String), String> {
    let url = Url::parse(database_url).map_err(|e| format!("URL parse error: {}", e))?;

    let mut sslrootcert_path = None;
    let mut clean_params = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == "sslrootcert" {
            sslrootcert_path = Some(value.into_owned());
        } else {
            clean_params.push(format!("{}={}", key, value));
        }
    }

    let sslrootcert_path = sslrootcert_path.ok_or("sslrootcert parameter missing")?;

    let mut clean_url = url.clone();
    clean_url.set_query(None);
    if !clean_params.is_empty() {
        clean_url.set_query(Some(&clean_params.join("&")));
    }

    Ok((clean_url.to_string(), sslrootcert_path))
}

pub async fn execute_with_retry<F, Fut>(
    database_url: &str,
    policy: RetryPolicy,
    operation: F,
) -> Result<u64, String>
where
    F: Fn(tokio_postgres::Client) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<u64, tokio_postgres::Error>> + Send,
{
    // URL errors are not retried.
    let (clean_database_url, sslrootcert_path) = split_sslrootcert(database_url)?;

    for attempt in 0..policy.max_retries {
        let connector = match create_ssl_connector(&sslrootcert_path) {
            Ok(c) => c,
            Err(e) => {
                error!("Attempt {}: SSL connector error: {}", attempt + 1, e);
                continue;
            }
        };

        match tokio_postgres::connect(&clean_database_url, connector).await {
            Ok((client, connection)) => {
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        error!("Connection error: {}", e);
                    }
                });

                match operation(client).await {
                    Ok(rows) => return Ok(rows),
                    Err(e) => error!("Attempt {}: query error: {}", attempt + 1, e),
                }
            }
            Err(e) => error!("Attempt {}: connection error: {}", attempt + 1, e),
        }

        if attempt + 1 < policy.max_retries {
            warn!(
                "Retrying in {} seconds",
                policy.wait_between_retries.as_secs()
            );
            tokio::time::sleep(policy.wait_between_retries).await;
        }
    }

    Err("Max retries exceeded".into())
}
