use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Unexpected, Visitor},
};

use crate::{TraceId, parse_decimal};

/// Serialized as a decimal string, the same form as the wire format.
impl Serialize for TraceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Accepts either a decimal string or an unsigned integer.
impl<'de> Deserialize<'de> for TraceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TraceIdVisitor)
    }
}

struct TraceIdVisitor;

impl Visitor<'_> for TraceIdVisitor {
    type Value = TraceId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal trace id below 2^63")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TraceId, E> {
        parse_decimal(v).map_err(|reason| E::custom(format_args!("invalid trace id: {reason}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TraceId, E> {
        let id = TraceId::from_raw(v);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(E::invalid_value(Unexpected::Unsigned(v), &self))
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TraceId, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }
}
