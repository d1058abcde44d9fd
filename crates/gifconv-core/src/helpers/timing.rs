// crates/gifconv-core/src/helpers/timing.rs
//
// Frame timing for the output animation. One duration for the whole sequence;
// GIF stores it in hundredths of a second.

use crate::error::DurationError;

/// Display time of one output frame in milliseconds:
/// `1000 / (frame_rate × playback_speed)`.
///
/// ```
/// use gifconv_core::helpers::timing::frame_duration_ms;
/// let d = frame_duration_ms(10.0, 1.0).unwrap();
/// assert!((d - 100.0).abs() < 1e-9);
/// assert!(frame_duration_ms(0.0, 1.0).is_err());
/// ```
pub fn frame_duration_ms(frame_rate: f64, playback_speed: f64) -> Result<f64, DurationError> {
    let err = DurationError { frame_rate, playback_speed };
    if !frame_rate.is_finite() || !playback_speed.is_finite()
        || frame_rate <= 0.0 || playback_speed <= 0.0
    {
        return Err(err);
    }
    let duration = 1000.0 / (frame_rate * playback_speed);
    if !duration.is_finite() || duration <= 0.0 {
        return Err(err);
    }
    Ok(duration)
}

/// Round a millisecond duration to the GIF delay unit (centiseconds).
///
/// Clamped to at least 1: a zero delay is rendered by most viewers as 100 ms,
/// which would make fast clips play slower instead of faster.
pub fn gif_delay_centis(duration_ms: f64) -> u16 {
    (duration_ms / 10.0).round().clamp(1.0, u16::MAX as f64) as u16
}
