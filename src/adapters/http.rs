//! HTTP client adapter.
//!
//! Implements [`HttpPort`] with one fresh `EspHttpConnection` per request:
//! no keep-alive, no pooling.  Bodies are only read for 200 responses and
//! never beyond [`MAX_BODY_BYTES`].
//!
//! On host targets the adapter returns a canned response set with
//! [`HttpAdapter::sim_respond`].

use log::debug;

use crate::app::ports::{HttpPort, HttpResponse};
use crate::error::HttpError;
use crate::weather::MAX_BODY_BYTES;

#[cfg(target_os = "espidf")]
use embedded_svc::{
    http::{Status, client::Client as HttpClient},
    io::Read,
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};

#[cfg(target_os = "espidf")]
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

pub struct HttpAdapter {
    requests: u32,
    #[cfg(not(target_os = "espidf"))]
    canned: Result<HttpResponse, HttpError>,
}

impl Default for HttpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAdapter {
    pub fn new() -> Self {
        Self {
            requests: 0,
            #[cfg(not(target_os = "espidf"))]
            canned: Err(HttpError::Connect),
        }
    }

    /// Requests issued since boot.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    #[cfg(target_os = "espidf")]
    fn platform_get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        let conf = HttpClientConfiguration {
            timeout: Some(REQUEST_TIMEOUT),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|_| HttpError::Connect)?;
        let mut client = HttpClient::wrap(conn);
        let request = client.get(url).map_err(|_| HttpError::Connect)?;
        let mut response = request.submit().map_err(|_| HttpError::Connect)?;

        let status = response.status();
        let mut body = Vec::new();
        if status == 200 {
            let mut chunk = [0u8; 512];
            loop {
                let n = response.read(&mut chunk).map_err(|_| HttpError::Io)?;
                if n == 0 {
                    break;
                }
                if body.len() + n > MAX_BODY_BYTES {
                    return Err(HttpError::BodyTooLarge);
                }
                body.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(HttpResponse { status, body })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_get(&mut self, _url: &str) -> Result<HttpResponse, HttpError> {
        let response = self.canned.clone()?;
        if response.body.len() > MAX_BODY_BYTES {
            return Err(HttpError::BodyTooLarge);
        }
        Ok(response)
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpAdapter {
    /// Simulation: every following request answers `status` with `body`.
    pub fn sim_respond(&mut self, status: u16, body: &[u8]) {
        self.canned = Ok(HttpResponse {
            status,
            body: body.to_vec(),
        });
    }
}

impl HttpPort for HttpAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests = self.requests.wrapping_add(1);
        debug!("HTTP: GET {}", url);
        let response = self.platform_get(url)?;
        debug!("HTTP: {} ({} bytes)", response.status, response.body.len());
        Ok(response)
    }
}
