//! Control-channel command vocabulary.
//!
//! Parameter updates arrive over an asynchronous serial link as short text
//! lines. The link itself (UART, DMA, echo) is board code; this module owns
//! the command vocabulary, the numeric conversions, and a no-allocation
//! line decoder. Decoded commands travel to the processing task through a
//! [`CommandQueue`] so coefficient updates are applied between samples on
//! the processing side rather than torn across contexts.
//!
//! Two commands exist:
//!
//! ```text
//! f,<channel>,<stage>,<centreHz>,<gainDb>,<Q>   retune one EQ stage
//! v,<channel>,<percent>                          set channel volume (0–100)
//! ```
//!
//! Malformed lines decode to `None` and are discarded whole; a bad line
//! never causes a partial state change.

use libm::powf;

use crate::sync::SpscQueue;

/// Capacity of the control-to-processor command queue.
pub const COMMAND_QUEUE_SLOTS: usize = 16;

/// SPSC queue carrying decoded commands from the control task to the
/// processing task.
pub type CommandQueue = SpscQueue<ControlCommand, COMMAND_QUEUE_SLOTS>;

/// A decoded parameter-update command.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlCommand {
    /// Retune one peaking EQ stage of one channel.
    SetFilter {
        channel: u8,
        stage: u8,
        centre_hz: f32,
        gain_db: f32,
        q: f32,
    },
    /// Set one channel's volume as a percentage (0–100).
    SetVolume { channel: u8, percent: u8 },
}

/// Convert a gain in dB to a linear multiplier: `10^(dB/20)`.
pub fn gain_db_to_linear(gain_db: f32) -> f32 {
    powf(10.0, gain_db / 20.0)
}

/// Convert a fader percentage to the channel volume multiplier.
///
/// Logarithmic taper `10^((p/100 − 1)·2)`, so 100 % is exactly unity and
/// 50 % is −20 dB. 0 % is a hard mute (exactly 0.0) rather than the −40 dB
/// the log law would give.
pub fn volume_percent_to_gain(percent: u8) -> f32 {
    if percent == 0 {
        return 0.0;
    }
    let p = if percent > 100 { 100 } else { percent } as f32 / 100.0;
    powf(10.0, (p - 1.0) * 2.0)
}

/// Decode one control line. Returns `None` for anything malformed:
/// unknown command letter, wrong field count, or unparseable numbers.
pub fn parse_line(line: &[u8]) -> Option<ControlCommand> {
    let line = core::str::from_utf8(line).ok()?;
    let line = line.trim_matches(|c: char| c == '\r' || c == '\n' || c == ' ' || c == '\0');

    let mut fields = line.split(',');
    let command = match fields.next()? {
        "f" => ControlCommand::SetFilter {
            channel: fields.next()?.parse().ok()?,
            stage: fields.next()?.parse().ok()?,
            centre_hz: fields.next()?.parse().ok()?,
            gain_db: fields.next()?.parse().ok()?,
            q: fields.next()?.parse().ok()?,
        },
        "v" => ControlCommand::SetVolume {
            channel: fields.next()?.parse().ok()?,
            percent: fields.next()?.parse().ok()?,
        },
        _ => return None,
    };

    // Trailing fields make the whole line malformed.
    if fields.next().is_some() {
        return None;
    }
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::fabsf;

    #[test]
    fn parses_filter_command() {
        let cmd = parse_line(b"f,0,1,53,14,1.8\r\n").unwrap();
        assert_eq!(
            cmd,
            ControlCommand::SetFilter {
                channel: 0,
                stage: 1,
                centre_hz: 53.0,
                gain_db: 14.0,
                q: 1.8,
            }
        );
    }

    #[test]
    fn parses_volume_command() {
        assert_eq!(
            parse_line(b"v,1,75"),
            Some(ControlCommand::SetVolume {
                channel: 1,
                percent: 75
            })
        );
    }

    #[test]
    fn parses_padded_line() {
        // Lines arrive from a fixed-size DMA buffer, NUL-padded.
        let mut buf = [0u8; 24];
        buf[..8].copy_from_slice(b"v,0,100\n");
        assert_eq!(
            parse_line(&buf),
            Some(ControlCommand::SetVolume {
                channel: 0,
                percent: 100
            })
        );
    }

    #[test]
    fn malformed_lines_are_discarded() {
        assert_eq!(parse_line(b"f,oops"), None);
        assert_eq!(parse_line(b""), None);
        assert_eq!(parse_line(b"x,0,50"), None);
        assert_eq!(parse_line(b"f,0,1,53,14"), None); // missing Q
        assert_eq!(parse_line(b"f,0,1,53,14,1.8,9"), None); // extra field
        assert_eq!(parse_line(b"v,0"), None);
        assert_eq!(parse_line(b"v,0,fifty"), None);
        assert_eq!(parse_line(b"v,300,50"), None); // channel out of u8
        assert_eq!(parse_line(&[0xFF, 0xFE, b',']), None); // invalid UTF-8
    }

    #[test]
    fn db_conversion() {
        assert!(fabsf(gain_db_to_linear(0.0) - 1.0) < 1e-6);
        assert!(fabsf(gain_db_to_linear(20.0) - 10.0) < 1e-4);
        assert!(fabsf(gain_db_to_linear(-20.0) - 0.1) < 1e-6);
        assert!(fabsf(gain_db_to_linear(14.0) - 5.0118723) < 1e-3);
    }

    #[test]
    fn volume_taper_endpoints_are_exact() {
        assert_eq!(volume_percent_to_gain(100), 1.0);
        assert_eq!(volume_percent_to_gain(0), 0.0);
    }

    #[test]
    fn volume_taper_is_monotonic() {
        let mut prev = volume_percent_to_gain(0);
        for p in 1..=100 {
            let g = volume_percent_to_gain(p);
            assert!(g > prev, "taper not monotonic at {p}%");
            prev = g;
        }
        // Values past 100 clamp to unity.
        assert_eq!(volume_percent_to_gain(250), 1.0);
    }
}
