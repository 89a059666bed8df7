//! Shared helpers for integration tests: a scripted stand-in for yt-dlp

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Metadata document the fake tool prints for `--dump-json`
pub const METADATA_JSON: &str = r#"{"id":"dQw4w9WgXcQ","title":"Fake Clip","duration":12.5,"uploader":"Tester","thumbnail":"https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg","formats":[{"format_id":"18","ext":"mp4","resolution":"640x360","filesize":1000},{"format_id":"140","ext":"m4a","filesize_approx":500}]}"#;

/// Bytes the fake tool writes as the downloaded media
pub const MEDIA_BYTES: &str = "fake media payload";

/// How the fake tool behaves when asked to download
#[derive(Clone, Copy)]
pub enum FakeBehavior {
    /// Announce a destination, print progress, write the file
    Succeed,
    /// Print an error on stderr and exit 1
    Fail,
    /// Exit 0 without announcing where the file went
    Silent,
}

/// Path to a fake yt-dlp with the given behavior
///
/// All scripts are written once, before any test spawns one, so no script is
/// ever open for writing while another thread forks (ETXTBSY).
pub fn fake_ytdlp(behavior: FakeBehavior) -> PathBuf {
    static SCRIPTS: OnceLock<TempDir> = OnceLock::new();
    let dir = SCRIPTS.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        for behavior in [FakeBehavior::Succeed, FakeBehavior::Fail, FakeBehavior::Silent] {
            write_fake_ytdlp(dir.path(), behavior);
        }
        dir
    });
    script_path(dir.path(), behavior)
}

fn script_path(dir: &Path, behavior: FakeBehavior) -> PathBuf {
    let name = match behavior {
        FakeBehavior::Succeed => "yt-dlp-succeed",
        FakeBehavior::Fail => "yt-dlp-fail",
        FakeBehavior::Silent => "yt-dlp-silent",
    };
    dir.join(name)
}

fn write_fake_ytdlp(dir: &Path, behavior: FakeBehavior) {
    let download = match behavior {
        FakeBehavior::Succeed => format!(
            r#"out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
dest=$(printf '%s' "$out" | sed -e 's/%(title)s/Fake Clip/' -e 's/%(ext)s/mp4/')
echo "[youtube] dQw4w9WgXcQ: Downloading webpage"
echo "[download] Destination: $dest"
echo "[download]  25.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
echo "[download]  50.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
printf '%s' '{MEDIA_BYTES}' > "$dest"
echo "[download] 100% of 1.00MiB in 00:01"
exit 0"#
        ),
        FakeBehavior::Fail => {
            "echo 'ERROR: [youtube] dQw4w9WgXcQ: Video unavailable' >&2\nexit 1".to_string()
        }
        FakeBehavior::Silent => {
            "echo '[youtube] dQw4w9WgXcQ: Downloading webpage'\nexit 0".to_string()
        }
    };

    let script = format!(
        r#"#!/bin/sh
case " $* " in
  *" --version "*) echo "2024.08.06"; exit 0 ;;
  *" --dump-json "*) echo '{METADATA_JSON}'; exit 0 ;;
esac
{download}
"#
    );

    let path = script_path(dir, behavior);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
