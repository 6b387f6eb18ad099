use super::{Centroid, Frame};
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use thiserror::Error;

/// One line of the feed, as emitted by the upstream landmark tracker:
/// the normalized landmark points it found, empty or absent when no face
/// was detected.
#[derive(Clone, Debug, Deserialize, PartialEq)]
struct RawFrame {
    #[serde(default)]
    landmarks: Vec<[f64; 2]>,
}

#[derive(Debug, Error)]
pub(crate) enum FeedError {
    #[error("failed to open tracker feed")]
    Open(#[source] std::io::Error),
}

/// Parse one feed line into a [`Frame`], reducing the landmark set to its
/// centroid.
fn parse_frame(line: &str) -> Result<Frame, serde_json::Error> {
    let raw: RawFrame = serde_json::from_str(line)?;
    Ok(match centroid(&raw.landmarks) {
        Some(center) => Frame::Face(center),
        None => Frame::NoFace,
    })
}

/// Mean position of a landmark set; `None` for an empty set.
fn centroid(points: &[[f64; 2]]) -> Option<Centroid> {
    if points.is_empty() {
        return None;
    }
    let n = f64::from(u32::try_from(points.len()).unwrap_or(u32::MAX));
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
    Some(Centroid::new(sx / n, sy / n))
}

/// Handle to the background thread tailing the tracker feed.
///
/// The thread parses frames and forwards them over a channel; it owns no
/// game state, so every mutation stays on the caller's thread.  Lines that
/// fail to parse are skipped.
#[derive(Debug)]
pub(crate) struct FrameFeed {
    frames: mpsc::Receiver<Frame>,
    stop: Arc<AtomicBool>,
}

impl FrameFeed {
    /// Tail `path` (`-` for stdin) on a background thread.
    pub(crate) fn open(path: &Path) -> Result<FrameFeed, FeedError> {
        let reader: Box<dyn BufRead + Send> = if path == Path::new("-") {
            Box::new(std::io::BufReader::new(std::io::stdin()))
        } else {
            let file = fs_err::File::open(path).map_err(FeedError::Open)?;
            Box::new(std::io::BufReader::new(file))
        };
        Ok(FrameFeed::from_reader(reader))
    }

    fn from_reader(reader: Box<dyn BufRead + Send>) -> FrameFeed {
        let (sender, frames) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        std::thread::spawn(move || {
            for line in reader.lines() {
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                let Ok(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let Ok(frame) = parse_frame(&line) else {
                    continue;
                };
                if sender.send(frame).is_err() {
                    break;
                }
            }
        });
        FrameFeed { frames, stop }
    }

    /// Frames that arrived since the last drain, oldest first.
    pub(crate) fn drain(&self) -> Vec<Frame> {
        self.frames.try_iter().collect()
    }

    /// Tell the reader thread to shut down.  Safe to call repeatedly, or
    /// when the thread has already exited.
    pub(crate) fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for FrameFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
