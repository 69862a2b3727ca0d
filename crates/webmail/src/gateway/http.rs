//! Mail backend HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic. The agent keeps a
//! cookie jar so a cookie-based server session rides along with the bearer
//! token on every call.

use log::debug;
use serde::de::DeserializeOwned;
use ureq::http::Response;
use ureq::{Agent, Body};

use super::api::{
    CurrentUserResponse, ErrorBody, LoginBody, LoginResponseBody, MailsResponse, SendBody,
    SignupBody,
};
use super::{GatewayError, LoginResponse, NetworkGateway, SignupRequest, normalize_mails, normalize_user};
use crate::config::ClientConfig;
use crate::models::{Credential, Draft, Mail, UserRef};

impl From<ureq::Error> for GatewayError {
    fn from(err: ureq::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// HTTP implementation of the backend contract
pub struct HttpGateway {
    agent: Agent,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for the configured backend
    pub fn new(config: &ClientConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.request_timeout()))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, credential: Option<&Credential>) -> Result<Response<Body>, GatewayError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let mut request = self.agent.get(&url);
        if let Some(credential) = credential {
            request = request.header("Authorization", &credential.bearer());
        }
        Ok(request.call()?)
    }

    fn post_empty(&self, path: &str, credential: Option<&Credential>) -> Result<Response<Body>, GatewayError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let mut request = self.agent.post(&url);
        if let Some(credential) = credential {
            request = request.header("Authorization", &credential.bearer());
        }
        Ok(request.send_empty()?)
    }

    fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        credential: Option<&Credential>,
        body: &B,
    ) -> Result<Response<Body>, GatewayError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let mut request = self.agent.post(&url);
        if let Some(credential) = credential {
            request = request.header("Authorization", &credential.bearer());
        }
        Ok(request.send_json(body)?)
    }

    fn fetch_mails(&self, path: &str, credential: Option<&Credential>) -> Result<Vec<Mail>, GatewayError> {
        let response = self.get(path, credential)?;
        let body: MailsResponse = read_json(response)?;
        Ok(normalize_mails(body.mails.unwrap_or_default()))
    }
}

/// Turn a non-success status into a rejection carrying the server message
fn check_status(mut response: Response<Body>) -> Result<Response<Body>, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .body_mut()
        .read_json::<ErrorBody>()
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty());

    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn read_json<T: DeserializeOwned>(response: Response<Body>) -> Result<T, GatewayError> {
    let mut response = check_status(response)?;
    response
        .body_mut()
        .read_json::<T>()
        .map_err(|e| GatewayError::Malformed(e.to_string()))
}

impl NetworkGateway for HttpGateway {
    fn fetch_current_user(&self, credential: Option<&Credential>) -> Result<UserRef, GatewayError> {
        let response = self.get("/auth/me", credential)?;
        let body: CurrentUserResponse = read_json(response)?;
        normalize_user(body.user)
    }

    fn login(&self, address: &str, secret: &str) -> Result<LoginResponse, GatewayError> {
        let body = LoginBody {
            email: address,
            password: secret,
        };
        let response = self.post_json("/auth/login", None, &body)?;
        let body: LoginResponseBody = read_json(response)?;

        Ok(LoginResponse {
            user: normalize_user(body.user)?,
            credential: body.token.filter(|t| !t.is_empty()).map(Credential::new),
        })
    }

    fn signup(&self, request: &SignupRequest) -> Result<(), GatewayError> {
        let body = SignupBody {
            name: &request.display_name,
            email: &request.address,
            password: &request.secret,
        };
        check_status(self.post_json("/auth/signup", None, &body)?)?;
        Ok(())
    }

    fn logout(&self, credential: Option<&Credential>) -> Result<(), GatewayError> {
        check_status(self.post_empty("/auth/logout", credential)?)?;
        Ok(())
    }

    fn fetch_inbox(&self, credential: Option<&Credential>) -> Result<Vec<Mail>, GatewayError> {
        self.fetch_mails("/mail/my", credential)
    }

    fn fetch_sent(&self, credential: Option<&Credential>) -> Result<Vec<Mail>, GatewayError> {
        self.fetch_mails("/mail/sent", credential)
    }

    fn send_mail(&self, credential: Option<&Credential>, draft: &Draft) -> Result<(), GatewayError> {
        let body = SendBody {
            to: &draft.to,
            subject: &draft.subject,
            text: &draft.text,
        };
        check_status(self.post_json("/mail/send", credential, &body)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let cfg = ClientConfig {
            api_url: "https://mail.example.com/api/".to_string(),
            ..ClientConfig::default()
        };
        let gateway = HttpGateway::new(&cfg);
        assert_eq!(gateway.url("/auth/me"), "https://mail.example.com/api/auth/me");
    }

    #[test]
    fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let cfg = ClientConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..ClientConfig::default()
        };
        let gateway = HttpGateway::new(&cfg);
        let result = gateway.fetch_inbox(None);
        assert!(matches!(result, Err(GatewayError::Transport(_))));
    }
}
