//! Typed sensor readings
//!
//! Raw bus events carry an untyped field set. Each signal kind decodes the
//! fields it needs into a [`Reading`], failing with a [`DecodeError`] rather
//! than guessing at missing or mistyped values.

use serde_json::{Map, Value};
use thiserror::Error;
use wx_core::{Context, SignalKind};

/// Errors decoding a sensor event's fields
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{kind} reading has no field set")]
    NotAnObject { kind: SignalKind },

    #[error("{kind} reading is missing required field '{field}'")]
    MissingField {
        kind: SignalKind,
        field: &'static str,
    },

    #[error("{kind} reading field '{field}' is not a number: {value}")]
    NotANumber {
        kind: SignalKind,
        field: &'static str,
        value: Value,
    },
}

/// A sensor event already resolved to the signal kind it reports
#[derive(Debug, Clone)]
pub struct SensorEvent {
    pub kind: SignalKind,
    pub fields: Value,
    pub context: Context,
}

impl SensorEvent {
    pub fn new(kind: SignalKind, fields: Value) -> Self {
        Self {
            kind,
            fields,
            context: Context::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Decode the field set into a typed reading
    pub fn decode(&self) -> Result<Reading, DecodeError> {
        Reading::decode(self.kind, &self.fields)
    }
}

/// A decoded reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Rain gauge totals in mm
    Rain { all_total: f64, day_total: f64 },
    /// Temperature in °C with optional relative humidity in %
    Temperature { temp: f64, humidity: Option<f64> },
    /// Relative humidity in %
    Humidity { humidity: f64 },
    /// Instantaneous wind speed in m/s
    Wind { speed: f64 },
}

impl Reading {
    /// Decode the fields of a `kind` event
    pub fn decode(kind: SignalKind, fields: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::new(kind, fields)?;
        match kind {
            SignalKind::Rain => Ok(Reading::Rain {
                all_total: fields.required("all_total")?,
                day_total: fields.required("day_total")?,
            }),
            SignalKind::Temperature => Ok(Reading::Temperature {
                temp: fields.required("temp")?,
                humidity: fields.optional("humidity")?,
            }),
            SignalKind::Humidity => Ok(Reading::Humidity {
                humidity: fields.required("humidity")?,
            }),
            SignalKind::Wind => Ok(Reading::Wind {
                speed: fields.required("speed")?,
            }),
        }
    }

    pub fn kind(&self) -> SignalKind {
        match self {
            Reading::Rain { .. } => SignalKind::Rain,
            Reading::Temperature { .. } => SignalKind::Temperature,
            Reading::Humidity { .. } => SignalKind::Humidity,
            Reading::Wind { .. } => SignalKind::Wind,
        }
    }
}

struct Fields<'a> {
    kind: SignalKind,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(kind: SignalKind, value: &'a Value) -> Result<Self, DecodeError> {
        value
            .as_object()
            .map(|map| Self { kind, map })
            .ok_or(DecodeError::NotAnObject { kind })
    }

    fn required(&self, field: &'static str) -> Result<f64, DecodeError> {
        self.optional(field)?.ok_or(DecodeError::MissingField {
            kind: self.kind,
            field,
        })
    }

    /// An absent or null field is `None`; any other non-number is an error
    fn optional(&self, field: &'static str) -> Result<Option<f64>, DecodeError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| DecodeError::NotANumber {
                    kind: self.kind,
                    field,
                    value: value.clone(),
                }),
        }
    }
}
