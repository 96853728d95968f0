use cpal::traits::{DeviceTrait, HostTrait};
use cpal::Host;
use serde::Serialize;

use super::AudioError;

/// Snapshot of one capture-capable device, taken at enumeration time.
/// Not refreshed if the hardware set changes afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct DeviceDescriptor {
    pub index: usize,
    pub name: String,
    pub input_channels: u16,
    pub output_channels: u16,
    pub default_sample_rate: u32,
}

/// Ordered keyword tiers tried in priority order: every device is checked
/// against the first tier before any device is checked against the next.
/// Extending a platform or locale means adding a tier, not new match logic.
pub struct RankedMatcher {
    tiers: &'static [&'static [&'static str]],
}

impl RankedMatcher {
    pub const fn new(tiers: &'static [&'static [&'static str]]) -> Self {
        Self { tiers }
    }

    /// First input-capable descriptor whose lowercased name contains any
    /// keyword of the highest-priority matching tier. Depends only on
    /// enumeration order and name content.
    pub fn find<'a>(&self, devices: &'a [DeviceDescriptor]) -> Option<&'a DeviceDescriptor> {
        for tier in self.tiers {
            for desc in devices {
                if desc.input_channels == 0 {
                    continue;
                }
                let name = desc.name.to_lowercase();
                if tier.iter().any(|kw| name.contains(kw)) {
                    return Some(desc);
                }
            }
        }
        None
    }
}

const MICROPHONE_MATCHER: RankedMatcher = RankedMatcher::new(&[&["microphone", "mic", "input"]]);

// "monitor" covers PulseAudio/PipeWire loopback sources, which never carry
// the Windows-style "stereo mix" naming.
const LOOPBACK_MATCHER: RankedMatcher = RankedMatcher::new(&[&[
    "stereo mix",
    "what u hear",
    "what you hear",
    "loopback",
    "monitor",
    "mix",
    "output",
]]);

/// Enumerate every device the host reports, capture-capable or not.
/// Output channel counts are kept so loopback classification can fall back
/// to devices that expose both directions.
pub fn enumerate(host: &Host) -> Result<Vec<(cpal::Device, DeviceDescriptor)>, AudioError> {
    let devices = host
        .devices()
        .map_err(|_| AudioError::NoDevicesFound)?
        .collect::<Vec<_>>();
    if devices.is_empty() {
        return Err(AudioError::NoDevicesFound);
    }

    let mut out = Vec::with_capacity(devices.len());
    for (index, device) in devices.into_iter().enumerate() {
        let name = device.name().unwrap_or_else(|_| format!("device {index}"));
        let input = device.default_input_config().ok();
        let output = device.default_output_config().ok();
        let default_sample_rate = input
            .as_ref()
            .map(|c| c.sample_rate().0)
            .or_else(|| output.as_ref().map(|c| c.sample_rate().0))
            .unwrap_or(0);

        let desc = DeviceDescriptor {
            index,
            name,
            input_channels: input.map(|c| c.channels()).unwrap_or(0),
            output_channels: output.map(|c| c.channels()).unwrap_or(0),
            default_sample_rate,
        };
        out.push((device, desc));
    }
    Ok(out)
}

/// First input-capable descriptor whose name marks it as a microphone.
pub fn classify_microphone(devices: &[DeviceDescriptor]) -> Option<&DeviceDescriptor> {
    MICROPHONE_MATCHER.find(devices)
}

/// First input-capable descriptor whose name marks it as a loopback of the
/// system output. Falls back to the first descriptor exposing both input
/// and output channels when no name matches.
pub fn classify_loopback(devices: &[DeviceDescriptor]) -> Option<&DeviceDescriptor> {
    LOOPBACK_MATCHER.find(devices).or_else(|| {
        devices
            .iter()
            .find(|d| d.input_channels > 0 && d.output_channels > 0)
    })
}

/// First input-capable descriptor whose name contains `needle`
/// (case-insensitive). Used for explicit device overrides.
pub fn find_by_name<'a>(
    devices: &'a [DeviceDescriptor],
    needle: &str,
) -> Option<&'a DeviceDescriptor> {
    let needle = needle.to_lowercase();
    devices
        .iter()
        .find(|d| d.input_channels > 0 && d.name.to_lowercase().contains(&needle))
}

/// Human-readable device table for diagnostics.
pub fn log_devices(devices: &[DeviceDescriptor]) {
    log::info!("Available audio devices:");
    for d in devices {
        log::info!(
            "  [{}] {} - in: {}, out: {}, {} Hz{}",
            d.index,
            d.name,
            d.input_channels,
            d.output_channels,
            d.default_sample_rate,
            if d.input_channels > 0 { "" } else { " (no capture)" },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(index: usize, name: &str, input: u16, output: u16) -> DeviceDescriptor {
        DeviceDescriptor {
            index,
            name: name.to_string(),
            input_channels: input,
            output_channels: output,
            default_sample_rate: 44_100,
        }
    }

    #[test]
    fn microphone_picks_first_named_input() {
        let devices = vec![
            desc(0, "Microphone (USB)", 2, 0),
            desc(1, "Speakers", 0, 2),
            desc(2, "Stereo Mix", 2, 0),
        ];
        let mic = classify_microphone(&devices).expect("microphone expected");
        assert_eq!(mic.index, 0);
    }

    #[test]
    fn loopback_picks_stereo_mix_over_microphone() {
        let devices = vec![
            desc(0, "Microphone (USB)", 2, 0),
            desc(1, "Speakers", 0, 2),
            desc(2, "Stereo Mix", 2, 0),
        ];
        let loopback = classify_loopback(&devices).expect("loopback expected");
        assert_eq!(loopback.index, 2);
    }

    #[test]
    fn loopback_ignores_output_only_devices() {
        let devices = vec![desc(0, "Stereo Mix", 0, 2), desc(1, "Line In Mix", 1, 0)];
        let loopback = classify_loopback(&devices).expect("loopback expected");
        assert_eq!(loopback.index, 1);
    }

    #[test]
    fn loopback_falls_back_to_duplex_device() {
        let devices = vec![
            desc(0, "Front Panel Jack", 0, 2),
            desc(1, "USB Interface", 2, 2),
        ];
        let loopback = classify_loopback(&devices).expect("fallback expected");
        assert_eq!(loopback.index, 1);
    }

    #[test]
    fn no_match_yields_none() {
        let devices = vec![desc(0, "Speakers", 0, 2)];
        assert!(classify_microphone(&devices).is_none());
        assert!(classify_loopback(&devices).is_none());
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let devices = vec![desc(0, "Scarlett 2i2 USB", 2, 2)];
        assert!(find_by_name(&devices, "scarlett").is_some());
        assert!(find_by_name(&devices, "focusrite").is_none());
    }
}
