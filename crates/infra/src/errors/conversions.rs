//! Conversions from external infrastructure errors into domain errors.

use estatedesk_domain::DeskError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DeskError);

impl From<InfraError> for DeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DeskError> for InfraError {
    fn from(value: DeskError) -> Self {
        InfraError(value)
    }
}

trait IntoDeskError {
    fn into_desk(self) -> DeskError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DeskError */
/* -------------------------------------------------------------------------- */

impl IntoDeskError for HttpError {
    fn into_desk(self) -> DeskError {
        if self.is_timeout() {
            return DeskError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DeskError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return DeskError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return DeskError::Serialization(format!("failed to decode HTTP response: {self}"));
        }

        DeskError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_desk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: DeskError = InfraError::from(error).into();
        assert!(matches!(mapped, DeskError::Network(_)), "got {mapped:?}");
    }

    #[test]
    fn invalid_url_maps_to_invalid_input() {
        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get("http://[::1").build().unwrap_err();

        let mapped: DeskError = InfraError::from(error).into();
        assert!(matches!(mapped, DeskError::InvalidInput(_)), "got {mapped:?}");
    }

    #[test]
    fn domain_error_round_trips_through_newtype() {
        let original = DeskError::Config("bad".into());
        let mapped: DeskError = InfraError::from(original.clone()).into();
        assert_eq!(mapped, original);
    }
}
