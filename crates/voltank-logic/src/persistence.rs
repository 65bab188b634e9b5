//! Save-state codec for a container's mutable runtime state.
//!
//! The wire format is the legacy comma-delimited string
//! `modifierName,fuelPresetLabel,containerPercent[,ratio]*` with one trailing
//! integer ratio per sub-container in the container's fixed resource order.
//! The string carries inputs only, never derived values; a full recompute
//! always follows decoding. Encode/decode are a pure function pair over
//! [`PersistentState`] so the codec is testable without a container.

/// The mutable inputs a container persists between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentState {
    /// Active modifier name.
    pub modifier: String,
    /// Active fuel-preset label, or the `"custom"` sentinel.
    pub fuel_preset: String,
    /// Fraction of the part's total volume held by this container.
    pub percent: f64,
    /// One ratio per sub-container, in eligible-resource order.
    pub ratios: Vec<u32>,
}

/// Encode a state to the delimited wire string.
pub fn encode(state: &PersistentState) -> String {
    let mut data = format!(
        "{},{},{}",
        state.modifier, state.fuel_preset, state.percent
    );
    for ratio in &state.ratios {
        data.push(',');
        data.push_str(&ratio.to_string());
    }
    data
}

/// Decode a wire string back into a state.
///
/// Decoding is positional. A short ratio tail is tolerated (absent ratios
/// are simply not present; the container leaves those sub-containers at 0),
/// and negative ratios clamp to 0, but the three leading fields must be
/// present and the percent and ratio fields must parse as numbers.
pub fn decode(data: &str) -> Result<PersistentState, DecodeError> {
    let fields: Vec<&str> = data.split(',').collect();
    if fields.len() < 3 {
        return Err(DecodeError::MissingFields(fields.len()));
    }
    let percent: f64 = fields[2]
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidPercent(fields[2].to_string()))?;
    let mut ratios = Vec::with_capacity(fields.len() - 3);
    for (index, field) in fields[3..].iter().enumerate() {
        let ratio: i64 = field.trim().parse().map_err(|_| DecodeError::InvalidRatio {
            index,
            value: field.to_string(),
        })?;
        ratios.push(ratio.max(0) as u32);
    }
    Ok(PersistentState {
        modifier: fields[0].to_string(),
        fuel_preset: fields[1].to_string(),
        percent,
        ratios,
    })
}

/// Errors from decoding persisted container data.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Fewer than the three mandatory leading fields were present.
    MissingFields(usize),
    /// The container-percent field did not parse as a number.
    InvalidPercent(String),
    /// A ratio field did not parse as an integer.
    InvalidRatio { index: usize, value: String },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MissingFields(found) => {
                write!(f, "persisted data has {} of 3 mandatory fields", found)
            }
            DecodeError::InvalidPercent(value) => {
                write!(f, "container percent '{}' is not a number", value)
            }
            DecodeError::InvalidRatio { index, value } => {
                write!(f, "ratio {} ('{}') is not an integer", index, value)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PersistentState {
        PersistentState {
            modifier: "standard".to_string(),
            fuel_preset: "LFO".to_string(),
            percent: 0.5,
            ratios: vec![9, 11, 0],
        }
    }

    #[test]
    fn encodes_delimited_string() {
        assert_eq!(encode(&state()), "standard,LFO,0.5,9,11,0");
    }

    #[test]
    fn roundtrip_state_through_string() {
        let decoded = decode(&encode(&state())).expect("decode");
        assert_eq!(decoded, state());
    }

    #[test]
    fn roundtrip_string_through_state() {
        for data in ["standard,custom,1,9,11", "foam,LFO,0.25", "a,b,2,0,0,0,3"] {
            let decoded = decode(data).expect("decode");
            assert_eq!(encode(&decoded), data, "string '{data}' should round-trip");
        }
    }

    #[test]
    fn short_ratio_tail_is_tolerated() {
        let decoded = decode("standard,custom,1").expect("decode");
        assert!(decoded.ratios.is_empty());
        let decoded = decode("standard,custom,1,9").expect("decode");
        assert_eq!(decoded.ratios, [9]);
    }

    #[test]
    fn negative_ratio_clamps_to_zero() {
        let decoded = decode("standard,custom,1,-4,11").expect("decode");
        assert_eq!(decoded.ratios, [0, 11]);
    }

    #[test]
    fn missing_leading_fields_fail() {
        assert_eq!(decode(""), Err(DecodeError::MissingFields(1)));
        assert_eq!(decode("standard"), Err(DecodeError::MissingFields(1)));
        assert_eq!(decode("standard,custom"), Err(DecodeError::MissingFields(2)));
    }

    #[test]
    fn non_numeric_percent_fails() {
        assert_eq!(
            decode("standard,custom,half"),
            Err(DecodeError::InvalidPercent("half".to_string()))
        );
    }

    #[test]
    fn non_numeric_ratio_fails() {
        assert_eq!(
            decode("standard,custom,1,9,lots"),
            Err(DecodeError::InvalidRatio {
                index: 1,
                value: "lots".to_string()
            })
        );
    }
}
