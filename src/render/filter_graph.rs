use std::sync::Arc;

use crate::composition::{Easing, Timeline};
use crate::error::{Result, SeamloopError};
use crate::video::MediaClip;

/// An ffmpeg `-filter_complex` script and its output pads
#[derive(Debug, Clone)]
pub struct FilterGraph {
    pub script: String,
    pub video_out: String,
    pub audio_out: Option<String>,
}

/// Layers that read the same source window
struct WindowGroup {
    window: MediaClip,
    forward: Vec<usize>,
    reversed: Vec<usize>,
}

impl FilterGraph {
    /// Lower a timeline to a filter graph over input `0`.
    ///
    /// Each distinct window is trimmed once and split; its reversed copy is
    /// derived once and split again. Layers are shifted to their start time,
    /// faded in on the alpha plane and stacked onto a black canvas in order,
    /// so a later layer always covers an earlier one. Audio, when present,
    /// follows the same trim/reverse split and is delayed and summed.
    pub fn build(timeline: &Timeline, with_audio: bool) -> Result<Self> {
        let source = timeline.source();
        if timeline
            .layers()
            .iter()
            .any(|l| !Arc::ptr_eq(l.segment.clip.source(), source))
        {
            return Err(SeamloopError::render("all layers must read the same input file"));
        }

        let groups = group_windows(timeline);
        let (width, height) = even_dimensions(source.resolution());
        let fps = source.fps();
        let total = timeline.duration();

        let mut chains: Vec<String> = Vec::new();
        let mut video_pads = vec![String::new(); timeline.layers().len()];

        for (g, group) in groups.iter().enumerate() {
            let head = format!(
                "[0:v]trim=start={:.6}:end={:.6},setpts=PTS-STARTPTS,scale={}:{},setsar=1,fps={:.6}",
                group.window.start(),
                group.window.end(),
                width,
                height,
                fps
            );
            split_chains(&mut chains, &mut video_pads, group, g, "v", &head, "split", "reverse,setpts=PTS-STARTPTS");
        }

        chains.push(format!(
            "color=c=black:s={}x{}:r={:.6}:d={:.6},format=yuv420p[bg]",
            width, height, fps, total
        ));

        let mut below = "bg".to_string();
        for (i, layer) in timeline.layers().iter().enumerate() {
            let fade = layer.fade_in();
            let mut chain = format!("[{}]format=yuva420p", video_pads[i]);
            if fade > 0.0 {
                chain.push(',');
                chain.push_str(&alpha_fade(timeline.easing(), fade));
            }
            chain.push_str(&format!(",setpts=PTS-STARTPTS+{:.6}/TB[l{}]", layer.start, i));
            chains.push(chain);

            let composed = format!("c{}", i);
            chains.push(format!("[{}][l{}]overlay=eof_action=pass[{}]", below, i, composed));
            below = composed;
        }
        chains.push(format!("[{}]format=yuv420p[vout]", below));

        let audio_out = if with_audio {
            let mut audio_pads = vec![String::new(); timeline.layers().len()];
            for (g, group) in groups.iter().enumerate() {
                let head = format!(
                    "[0:a]atrim=start={:.6}:end={:.6},asetpts=PTS-STARTPTS",
                    group.window.start(),
                    group.window.end()
                );
                split_chains(&mut chains, &mut audio_pads, group, g, "a", &head, "asplit", "areverse,asetpts=PTS-STARTPTS");
            }

            let mut delayed = String::new();
            for (i, layer) in timeline.layers().iter().enumerate() {
                let delay_ms = (layer.start * 1000.0).round() as u64;
                chains.push(format!("[{}]adelay=delays={}:all=1[d{}]", audio_pads[i], delay_ms, i));
                delayed.push_str(&format!("[d{}]", i));
            }

            let layer_count = timeline.layers().len();
            if layer_count == 1 {
                chains.push(format!("{}atrim=end={:.6}[aout]", delayed, total));
            } else {
                chains.push(format!(
                    "{}amix=inputs={}:duration=longest:dropout_transition=0:normalize=0,atrim=end={:.6}[aout]",
                    delayed, layer_count, total
                ));
            }
            Some("aout".to_string())
        } else {
            None
        };

        Ok(Self {
            script: chains.join(";"),
            video_out: "vout".to_string(),
            audio_out,
        })
    }
}

/// Emit the trim/split chain for one window group and record which pad
/// feeds each layer. Reversed layers share one reversing filter.
#[allow(clippy::too_many_arguments)]
fn split_chains(
    chains: &mut Vec<String>,
    pads: &mut [String],
    group: &WindowGroup,
    g: usize,
    kind: &str,
    head: &str,
    split: &str,
    reverse: &str,
) {
    let needs_reverse = !group.reversed.is_empty();
    let outputs = group.forward.len() + usize::from(needs_reverse);

    let mut chain = format!("{},{}={}", head, split, outputs);
    for (k, &layer) in group.forward.iter().enumerate() {
        let pad = format!("{}{}f{}", kind, g, k);
        chain.push_str(&format!("[{}]", pad));
        pads[layer] = pad;
    }
    if needs_reverse {
        chain.push_str(&format!("[{}{}rs]", kind, g));
    }
    chains.push(chain);

    if needs_reverse {
        let mut chain = format!("[{}{}rs]{},{}={}", kind, g, reverse, split, group.reversed.len());
        for (k, &layer) in group.reversed.iter().enumerate() {
            let pad = format!("{}{}r{}", kind, g, k);
            chain.push_str(&format!("[{}]", pad));
            pads[layer] = pad;
        }
        chains.push(chain);
    }
}

fn group_windows(timeline: &Timeline) -> Vec<WindowGroup> {
    let mut groups: Vec<WindowGroup> = Vec::new();

    for (i, layer) in timeline.layers().iter().enumerate() {
        let clip = &layer.segment.clip;
        let index = match groups.iter().position(|g| g.window.same_window(clip)) {
            Some(index) => index,
            None => {
                groups.push(WindowGroup {
                    window: clip.clone(),
                    forward: Vec::new(),
                    reversed: Vec::new(),
                });
                groups.len() - 1
            }
        };

        if clip.is_reversed() {
            groups[index].reversed.push(i);
        } else {
            groups[index].forward.push(i);
        }
    }

    groups
}

/// yuv420p needs even dimensions
fn even_dimensions((width, height): (u32, u32)) -> (u32, u32) {
    ((width - width % 2).max(2), (height - height % 2).max(2))
}

fn alpha_fade(easing: Easing, fade: f64) -> String {
    match easing {
        Easing::Linear => format!("fade=t=in:st=0:d={:.6}:alpha=1", fade),
        other => {
            let progress = format!("clip(T/{:.6},0,1)", fade);
            format!(
                "geq=lum='lum(X,Y)':cb='cb(X,Y)':cr='cr(X,Y)':a='255*{}'",
                other.ffmpeg_expr(&progress)
            )
        }
    }
}
