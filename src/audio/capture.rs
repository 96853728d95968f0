use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Host, Sample, SampleFormat, SizedSample, StreamConfig};
use std::sync::Arc;

use super::device::{self, DeviceDescriptor};
use super::queue::{AudioFrame, FrameQueue};
use super::AudioError;
use crate::state::AudioSource;

/// Fixed capture parameters, decided once at startup.
#[derive(Clone, Copy, Debug)]
pub struct StreamParams {
    pub sample_rate: u32,
    pub chunk_size: usize,
}

/// An open input stream. Dropping it stops callback delivery before the
/// handle is released, so no frame arrives after the owner lets go.
pub struct CaptureStream {
    stream: cpal::Stream,
    pub device_name: String,
}

impl CaptureStream {
    pub fn open(
        device: &cpal::Device,
        desc: &DeviceDescriptor,
        params: &StreamParams,
        queue: Arc<FrameQueue>,
    ) -> Result<Self, AudioError> {
        if desc.input_channels == 0 {
            return Err(AudioError::NoInputChannels(desc.name.clone()));
        }

        let supported = device.default_input_config().map_err(|e| AudioError::open_failed(&desc.name, e))?;
        let sample_format = supported.sample_format();
        let mut config: StreamConfig = supported.config();
        if config.sample_rate.0 != params.sample_rate {
            // Not every backend honors an arbitrary rate request; stay near
            // the device's native rate instead of failing the open.
            config.sample_rate.0 = config.sample_rate.0.clamp(44_100, 48_000);
            log::debug!(
                "{}: using {} Hz instead of requested {} Hz",
                desc.name,
                config.sample_rate.0,
                params.sample_rate
            );
        }

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(device, &config, params.chunk_size, queue),
            SampleFormat::I16 => build_stream::<i16>(device, &config, params.chunk_size, queue),
            SampleFormat::U16 => build_stream::<u16>(device, &config, params.chunk_size, queue),
            other => {
                return Err(AudioError::open_failed(
                    &desc.name,
                    anyhow::anyhow!("unsupported sample format {other:?}"),
                ))
            }
        }
        .map_err(|e| AudioError::open_failed(&desc.name, e))?;

        stream
            .play()
            .map_err(|e| AudioError::open_failed(&desc.name, e))?;

        log::info!(
            "Opened capture stream on '{}' ({} ch, {} Hz, {}-sample frames)",
            desc.name,
            config.channels,
            config.sample_rate.0,
            params.chunk_size
        );

        Ok(Self {
            stream,
            device_name: desc.name.clone(),
        })
    }

    /// Flush and stop delivery. Dropping afterwards releases the handle.
    pub fn stop(&self) {
        if let Err(e) = self.stream.pause() {
            log::warn!("failed to pause capture stream: {e}");
        }
    }
}

/// The callback downmixes interleaved channels to mono and hands every
/// completed `chunk`-sample frame to the queue. It runs on the audio
/// backend's real-time thread: its only side effect is the non-blocking
/// queue push, and the accumulation buffer is reused between invocations.
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    chunk: usize,
    queue: Arc<FrameQueue>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let mut pending: Vec<i16> = Vec::with_capacity(chunk * 2);
    let err_fn = |e| log::warn!("capture stream error: {e}");

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            for frame in data.chunks_exact(channels) {
                let mut acc = 0.0f32;
                for &s in frame {
                    acc += f32::from_sample(s);
                }
                pending.push(i16::from_sample(acc / channels as f32));
            }
            while pending.len() >= chunk {
                let frame: AudioFrame = pending.drain(..chunk).collect();
                queue.push(frame);
            }
        },
        err_fn,
        None,
    )
}

/// Owns the enumerated device snapshot and the currently open stream.
/// Lives on the UI thread; switching drops the old stream before opening
/// the new device, which serializes it against the capture callback.
pub struct CaptureManager {
    devices: Vec<(cpal::Device, DeviceDescriptor)>,
    stream: Option<CaptureStream>,
    params: StreamParams,
    queue: Arc<FrameQueue>,
}

impl CaptureManager {
    pub fn new(host: &Host, params: StreamParams, queue: Arc<FrameQueue>) -> Result<Self, AudioError> {
        let devices = device::enumerate(host)?;
        Ok(Self {
            devices,
            stream: None,
            params,
            queue,
        })
    }

    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        self.devices.iter().map(|(_, d)| d.clone()).collect()
    }

    pub fn current_device_name(&self) -> Option<&str> {
        self.stream.as_ref().map(|s| s.device_name.as_str())
    }

    /// Open the classified device for `source`, closing any existing stream
    /// first. On failure the previous stream stays closed and the error is
    /// returned so the caller can report and fall back explicitly.
    pub fn open_source(&mut self, source: AudioSource) -> Result<String, AudioError> {
        let descriptors: Vec<DeviceDescriptor> =
            self.devices.iter().map(|(_, d)| d.clone()).collect();
        let desc = match source {
            AudioSource::Microphone => device::classify_microphone(&descriptors),
            AudioSource::Speaker => device::classify_loopback(&descriptors),
        }
        .ok_or_else(|| AudioError::DeviceSwitchUnavailable(source.to_string()))?
        .clone();

        self.open_index(desc.index)
    }

    /// Open the first input-capable device whose name contains `needle`.
    pub fn open_matching(&mut self, needle: &str) -> Result<String, AudioError> {
        let descriptors: Vec<DeviceDescriptor> =
            self.devices.iter().map(|(_, d)| d.clone()).collect();
        let desc = device::find_by_name(&descriptors, needle)
            .ok_or_else(|| AudioError::DeviceSwitchUnavailable(format!("'{needle}'")))?
            .clone();
        self.open_index(desc.index)
    }

    fn open_index(&mut self, index: usize) -> Result<String, AudioError> {
        self.close();

        let (device, desc) = &self.devices[index];
        let stream = CaptureStream::open(device, desc, &self.params, Arc::clone(&self.queue))?;
        let name = stream.device_name.clone();
        self.stream = Some(stream);
        Ok(name)
    }

    /// Stop and release the current stream, if any.
    pub fn close(&mut self) {
        if let Some(old) = self.stream.take() {
            old.stop();
            log::debug!("closed capture stream on '{}'", old.device_name);
        }
    }
}
