use crate::constants::{
    DRONE_BASE_HZ, DRONE_DETUNE_CENTS, DRONE_FIFTH_RATIO, DRONE_LEVEL, DRONE_LOWPASS_HZ,
    MUTE_RAMP_SEC,
};
use web_sys as web;

/// Low ambient drone: root and fifth oscillators through a lowpass into one
/// master gain. Muting ramps the master instead of stopping the sources.
pub struct AmbientAudio {
    ctx: web::AudioContext,
    master: web::GainNode,
    tone: web::BiquadFilterNode,
    _voices: Vec<web::OscillatorNode>,
}

fn create_gain(ctx: &web::AudioContext, value: f32, label: &str) -> Result<web::GainNode, ()> {
    match web::GainNode::new(ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("[audio] {label} GainNode error: {e:?}");
            Err(())
        }
    }
}

fn create_voice(
    ctx: &web::AudioContext,
    kind: web::OscillatorType,
    hz: f32,
    detune_cents: f32,
    level: f32,
    out: &web::AudioNode,
) -> Result<web::OscillatorNode, ()> {
    let osc = web::OscillatorNode::new(ctx).map_err(|e| {
        log::error!("[audio] OscillatorNode error: {e:?}");
    })?;
    osc.set_type(kind);
    osc.frequency().set_value(hz);
    osc.detune().set_value(detune_cents);
    let gain = create_gain(ctx, level, "voice")?;
    _ = osc.connect_with_audio_node(&gain);
    _ = gain.connect_with_audio_node(out);
    _ = osc.start();
    Ok(osc)
}

impl AmbientAudio {
    /// Builds the graph silent; `set_muted(false)` after a user gesture fades it in.
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let build = || -> Result<Self, ()> {
            let master = create_gain(&ctx, 0.0, "master")?;
            let tone = web::BiquadFilterNode::new(&ctx).map_err(|e| {
                log::error!("[audio] BiquadFilterNode error: {e:?}");
            })?;
            tone.set_type(web::BiquadFilterType::Lowpass);
            tone.frequency().set_value(DRONE_LOWPASS_HZ * 0.5);
            tone.q().set_value(0.7);
            _ = tone.connect_with_audio_node(&master);
            _ = master.connect_with_audio_node(&ctx.destination());

            let voices = vec![
                create_voice(&ctx, web::OscillatorType::Sine, DRONE_BASE_HZ, 0.0, 0.6, &tone)?,
                create_voice(
                    &ctx,
                    web::OscillatorType::Triangle,
                    DRONE_BASE_HZ,
                    DRONE_DETUNE_CENTS,
                    0.25,
                    &tone,
                )?,
                create_voice(
                    &ctx,
                    web::OscillatorType::Sine,
                    DRONE_BASE_HZ * DRONE_FIFTH_RATIO,
                    -DRONE_DETUNE_CENTS,
                    0.3,
                    &tone,
                )?,
            ];
            Ok(Self {
                ctx: ctx.clone(),
                master,
                tone,
                _voices: voices,
            })
        };
        build().map_err(|_| anyhow::anyhow!("audio graph construction failed"))
    }

    /// Browsers start contexts suspended until a user gesture.
    pub fn resume(&self) {
        if self.ctx.state() == web::AudioContextState::Suspended {
            _ = self.ctx.resume();
        }
    }

    pub fn set_muted(&self, muted: bool) {
        let target = if muted { 0.0 } else { DRONE_LEVEL };
        let now = self.ctx.current_time();
        let gain = self.master.gain();
        _ = gain.cancel_scheduled_values(now);
        _ = gain.set_value_at_time(gain.value(), now);
        _ = gain.linear_ramp_to_value_at_time(target, now + MUTE_RAMP_SEC);
        log::info!("[audio] muted={muted}");
    }

    /// Opens the filter as the ritual progresses (0..1).
    pub fn set_swell(&self, progress: f32) {
        let p = progress.clamp(0.0, 1.0);
        self.tone
            .frequency()
            .set_value(DRONE_LOWPASS_HZ * (0.5 + 0.5 * p));
    }
}
