//! Interpretation of structured probe output

use serde_json::Value;

use crate::domain::errors::{ProbeFailure, ProbeFailureKind};
use crate::domain::model::{ProbedAudioStream, ProbedVideoInfo};

/// Parse an `N/D` frame rate. `0/0` and other degenerate ratios are unknown.
pub fn parse_frame_rate(text: &str) -> Option<f64> {
    let text = text.trim();
    let rate = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => text.parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Numeric field that ffprobe may emit as a string or a number
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    let field = value.get(key)?;
    let number = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn integer_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn first_stream(json: &Value) -> Option<&Value> {
    json.get("streams")?.as_array()?.first()
}

/// Audio streams in enumeration order. A missing `streams` key means none.
pub fn parse_audio_streams(json: &Value) -> Result<Vec<ProbedAudioStream>, ProbeFailure> {
    let streams = match json.get("streams") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(streams)) => streams,
        Some(other) => {
            return Err(ProbeFailure::new(
                ProbeFailureKind::ParseError,
                format!("expected a stream list, got {}", other),
            ))
        }
    };

    let mut parsed = Vec::with_capacity(streams.len());
    for stream in streams {
        let index = match stream.get("index") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(ProbeFailure::new(
                    ProbeFailureKind::ParseError,
                    format!("audio stream without index: {}", stream),
                ))
            }
        };
        let language = stream
            .get("tags")
            .and_then(|tags| tags.get("language"))
            .and_then(|lang| lang.as_str())
            .map(|lang| lang.to_string());
        parsed.push(ProbedAudioStream::new(index, language));
    }
    Ok(parsed)
}

/// Duration, rate and frame count of the first video stream, plus container duration
pub fn parse_video_info(json: &Value) -> ProbedVideoInfo {
    let stream = first_stream(json);
    ProbedVideoInfo {
        duration_seconds: stream.and_then(|s| number_field(s, "duration")),
        format_duration_seconds: json.get("format").and_then(|f| number_field(f, "duration")),
        frame_rate: stream
            .and_then(|s| s.get("r_frame_rate"))
            .and_then(|r| r.as_str())
            .and_then(parse_frame_rate),
        frame_count: stream.and_then(|s| integer_field(s, "nb_frames")),
    }
}
