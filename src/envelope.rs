use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Status codes of the provider's response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YappyCode {
    Success,
    NoData,
    ProcessingError,
    MissingHeaders,
    InvalidHash,
    InvalidBody,
    InvalidSession,
    ReversalFailed,
    AlreadySettled,
    FailedTransaction,
    ReversedTransaction,
    TooManyAliases,
    LimitOutOfRange,
    ServiceTimeout,
}

impl YappyCode {
    /// The wire code, e.g. `YP-0000`.
    pub fn code(self) -> &'static str {
        match self {
            YappyCode::Success => "YP-0000",
            YappyCode::NoData => "YP-0001",
            YappyCode::ProcessingError => "YP-0002",
            YappyCode::MissingHeaders => "YP-0008",
            YappyCode::InvalidHash => "YP-0009",
            YappyCode::InvalidBody => "YP-0010",
            YappyCode::InvalidSession => "YP-0011",
            YappyCode::ReversalFailed => "YP-0013",
            YappyCode::AlreadySettled => "YP-0014",
            YappyCode::FailedTransaction => "YP-0015",
            YappyCode::ReversedTransaction => "YP-0016",
            YappyCode::TooManyAliases => "YP-0039",
            YappyCode::LimitOutOfRange => "YP-0040",
            YappyCode::ServiceTimeout => "YP-9999",
        }
    }

    /// The provider's canned description for the code.
    pub fn description(self) -> &'static str {
        match self {
            YappyCode::Success => "Se ha realizado la ejecución del servicio correctamente",
            YappyCode::NoData => {
                "Se ha realizado la ejecución del servicio correctamente, pero no se encontraron datos relacionados con la búsqueda"
            }
            YappyCode::ProcessingError => {
                "Error, ha ocurrido un error en procesar los datos. Contacte al administrador"
            }
            YappyCode::MissingHeaders => "Error, cabeceras obligatorias faltantes en la peticion",
            YappyCode::InvalidHash => "Error, el código de autenticación no es válido",
            YappyCode::InvalidBody => {
                "Error, uno o mas campos del cuerpo de la peticion no cumplen con los valores enumerados"
            }
            YappyCode::InvalidSession => "Error, token de sesión inválido o expirado",
            YappyCode::ReversalFailed => "Error, ha ocurrido un error en la ejecucion de la reversa.",
            YappyCode::AlreadySettled => {
                "Error, la reversa no puede ser procesada porque ya se liquido."
            }
            YappyCode::FailedTransaction => {
                "La transaccion que se intenta reversar posee un estado fallido. No se requieren acciones adicionales."
            }
            YappyCode::ReversedTransaction => {
                "La transaccion que se intenta reversar posee un estado reversado. No se requieren acciones adicionales."
            }
            YappyCode::TooManyAliases => "Error, la cantidad de alias excede el máximo permitido",
            YappyCode::LimitOutOfRange => {
                "Error, el límite de consulta está fuera del rango permitido"
            }
            YappyCode::ServiceTimeout => "Error, el servicio ha tardado en responder",
        }
    }
}

/// The `status` object of every provider response.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub code: &'static str,
    pub description: &'static str,
}

impl From<YappyCode> for Status {
    fn from(code: YappyCode) -> Self {
        Self {
            code: code.code(),
            description: code.description(),
        }
    }
}

/// The provider response envelope: `{ body?, status: { code, description } }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
    pub status: Status,
}

impl<T: Serialize> Envelope<T> {
    /// A `YP-0000` envelope carrying `body`.
    pub fn success(body: T) -> Self {
        Self {
            body: Some(body),
            status: YappyCode::Success.into(),
        }
    }

    /// Renders the envelope with the given HTTP status.
    pub fn respond(&self, status: StatusCode) -> Response {
        json_response(status, self)
    }
}

impl Envelope<()> {
    /// An envelope without a body.
    pub fn status_only(code: YappyCode) -> Self {
        Self {
            body: None,
            status: code.into(),
        }
    }
}

/// Serializes `value` with sonic-rs into an `application/json` response.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    let body = sonic_rs::to_string(value).unwrap_or_else(|e| {
        tracing::error!("❌ Response serialization failed: {}", e);
        r#"{"status":{"code":"YP-9999","description":"Error, el servicio ha tardado en responder"}}"#
            .to_string()
    });

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
