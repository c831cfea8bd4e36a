//! UPI payment requests rendered as QR codes.
//!
//! A request only encodes the payee and amount. Nothing reports back when the
//! patient pays, so settling a bill stays a manual action.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Billing;

/// Third-party endpoint that turns a payload into a QR image.
pub const QR_IMAGE_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Default QR image edge in pixels.
pub const DEFAULT_QR_SIZE: u32 = 250;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Bill {0} is already paid")]
    AlreadyPaid(String),

    #[error("QR generation failed: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

/// A request for payment to a UPI payee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpiPaymentRequest {
    /// Payee virtual payment address, e.g. "clinic@okaxis"
    pub payee_id: String,
    /// Name shown in the payer's app
    pub payee_name: String,
    /// Amount in rupees. `None` lets the payer enter it.
    pub amount: Option<f64>,
}

impl UpiPaymentRequest {
    pub fn new(payee_id: impl Into<String>, payee_name: impl Into<String>, amount: f64) -> Self {
        Self {
            payee_id: payee_id.into(),
            payee_name: payee_name.into(),
            amount: Some(amount),
        }
    }

    /// The clinic's general scan-to-pay code, with no amount.
    pub fn for_clinic(payee_id: impl Into<String>, payee_name: impl Into<String>) -> Self {
        Self {
            payee_id: payee_id.into(),
            payee_name: payee_name.into(),
            amount: None,
        }
    }

    /// Request the outstanding amount of a bill.
    pub fn for_bill(
        bill: &Billing,
        payee_id: impl Into<String>,
        payee_name: impl Into<String>,
    ) -> PaymentResult<Self> {
        if !bill.status().is_outstanding() {
            return Err(PaymentError::AlreadyPaid(bill.id.clone()));
        }
        Ok(Self::new(payee_id, payee_name, bill.amount_due()))
    }

    /// `upi://pay?pa=..&pn=..`, plus `&am=..&cu=INR` when an amount is set.
    pub fn to_uri(&self) -> String {
        let mut uri = format!(
            "upi://pay?pa={}&pn={}",
            encode_component(&self.payee_id),
            encode_component(&self.payee_name)
        );
        if let Some(amount) = self.amount {
            uri.push_str(&format!("&am={:.2}&cu=INR", amount));
        }
        uri
    }

    /// URL of a `size`x`size` QR image of the payment URI.
    pub fn qr_image_url(&self, size: u32) -> String {
        format!(
            "{}?size={}x{}&data={}",
            QR_IMAGE_ENDPOINT,
            size,
            size,
            encode_component(&self.to_uri())
        )
    }

    /// Render the payment URI as an SVG QR code locally.
    pub fn qr_svg(&self) -> PaymentResult<String> {
        use qrcode::render::svg;
        use qrcode::QrCode;

        let code = QrCode::new(self.to_uri().as_bytes())?;
        let svg_string = code
            .render::<svg::Color>()
            .min_dimensions(200, 200)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .quiet_zone(true)
            .build();
        Ok(svg_string)
    }
}

/// Percent-encode like a URI component: everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(cost: f64, paid: f64) -> Billing {
        Billing {
            id: "b5".into(),
            patient_id: "4".into(),
            service: "Teeth Whitening".into(),
            cost,
            paid_amount: paid,
            date: "2024-06-01T11:00:00Z".into(),
        }
    }

    #[test]
    fn test_uri() {
        let request = UpiPaymentRequest::new("clinic@okaxis", "Dental Flow", 450.0);
        assert_eq!(
            request.to_uri(),
            "upi://pay?pa=clinic%40okaxis&pn=Dental%20Flow&am=450.00&cu=INR"
        );
    }

    #[test]
    fn test_qr_image_url_encodes_uri() {
        let request = UpiPaymentRequest::new("clinic@okaxis", "DentalFlow", 12.5);
        let url = request.qr_image_url(250);
        assert!(url.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=250x250&data="));
        assert!(url.ends_with("upi%3A%2F%2Fpay%3Fpa%3Dclinic%2540okaxis%26pn%3DDentalFlow%26am%3D12.50%26cu%3DINR"));
    }

    #[test]
    fn test_for_bill_requests_amount_due() {
        let request = UpiPaymentRequest::for_bill(&bill(300.0, 100.0), "clinic@okaxis", "DentalFlow").unwrap();
        assert_eq!(request.amount, Some(200.0));
    }

    #[test]
    fn test_for_bill_rejects_paid() {
        let result = UpiPaymentRequest::for_bill(&bill(300.0, 300.0), "clinic@okaxis", "DentalFlow");
        assert!(matches!(result, Err(PaymentError::AlreadyPaid(id)) if id == "b5"));
    }

    #[test]
    fn test_clinic_request_has_no_amount() {
        let request = UpiPaymentRequest::for_clinic("clinic@okaxis", "Dental Flow");
        assert_eq!(request.to_uri(), "upi://pay?pa=clinic%40okaxis&pn=Dental%20Flow");
        assert!(request.qr_svg().unwrap().contains("<svg"));
    }

    #[test]
    fn test_payee_id_is_encoded() {
        let request = UpiPaymentRequest::new("clinic&am=1@upi", "DentalFlow", 450.0);
        let uri = request.to_uri();
        assert!(uri.starts_with("upi://pay?pa=clinic%26am%3D1%40upi&pn="));
        assert_eq!(uri.matches("&am=").count(), 1);
    }

    #[test]
    fn test_qr_svg() {
        let request = UpiPaymentRequest::new("clinic@okaxis", "DentalFlow", 450.0);
        let svg = request.qr_svg().unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_component("₹"), "%E2%82%B9");
    }
}
