//! Button icon loading.
//!
//! Icons are given as `embed:NAME` (bundled SVG), an absolute path, or a
//! freedesktop icon name looked up in the installed themes. Loading never
//! fails: a missing icon falls back to `image-missing`, then `unknown`, then
//! the bundled `image-missing`.

use anyhow::{anyhow, bail, Context, Result};
use iced::widget::{image, svg};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MISSING_ICON: &str = "image-missing";
pub const UNKNOWN_ICON: &str = "unknown";
const FALLBACK_THEME: &str = "hicolor";

macro_rules! embedded_icons {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_bytes!(concat!("../assets/icons/", $name, ".svg")) as &[u8])),*]
    };
}

static EMBEDDED: &[(&str, &[u8])] = embedded_icons![
    "image-missing",
    "system-log-out-symbolic-dark",
    "system-log-out-symbolic-light",
    "system-reboot-symbolic-dark",
    "system-reboot-symbolic-light",
    "system-shutdown-symbolic-dark",
    "system-shutdown-symbolic-light",
    "system-suspend-symbolic-dark",
    "system-suspend-symbolic-light",
    "system-hibernate-symbolic-dark",
    "system-hibernate-symbolic-light",
    "system-lock-screen-symbolic-dark",
    "system-lock-screen-symbolic-light",
];

pub fn embedded(name: &str) -> Option<&'static [u8]> {
    EMBEDDED.iter().find(|(n, _)| *n == name).map(|(_, bytes)| *bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSpec {
    Embedded(String),
    File(PathBuf),
    Named(String),
}

impl IconSpec {
    pub fn parse(icon: &str) -> Self {
        if let Some(name) = icon.strip_prefix("embed:") {
            IconSpec::Embedded(name.to_string())
        } else if icon.starts_with('/') {
            IconSpec::File(PathBuf::from(icon))
        } else if icon.is_empty() {
            IconSpec::Named(MISSING_ICON.to_string())
        } else {
            IconSpec::Named(icon.to_string())
        }
    }
}

/// Where a resolved icon's data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Embedded(&'static [u8]),
    Svg(PathBuf),
    Raster(PathBuf),
}

impl IconSource {
    /// Classify `path` by extension and make sure its contents can be drawn.
    fn from_path(path: PathBuf) -> Result<Self> {
        if is_svg(&path) {
            check_svg(&path)?;
            Ok(IconSource::Svg(path))
        } else {
            ::image::open(&path)
                .with_context(|| format!("Icon {} cannot be decoded", path.display()))?;
            Ok(IconSource::Raster(path))
        }
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn check_svg(path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Icon {} is not readable SVG", path.display()))?;
    let contents = contents.trim_end();
    if !contents.contains("<svg") || !(contents.ends_with("</svg>") || contents.ends_with("/>")) {
        bail!("Icon {} is not a complete SVG document", path.display());
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub enum Icon {
    Svg(svg::Handle),
    Raster(image::Handle),
}

impl From<IconSource> for Icon {
    fn from(source: IconSource) -> Self {
        match source {
            IconSource::Embedded(bytes) => Icon::Svg(svg::Handle::from_memory(bytes)),
            IconSource::Svg(path) => Icon::Svg(svg::Handle::from_path(path)),
            IconSource::Raster(path) => Icon::Raster(image::Handle::from_path(path)),
        }
    }
}

/// Freedesktop-style icon theme lookup.
#[derive(Debug, Clone)]
pub struct IconLookup {
    base_dirs: Vec<PathBuf>,
    pixmap_dirs: Vec<PathBuf>,
    themes: Vec<String>,
}

impl IconLookup {
    pub fn new(theme: &str) -> Self {
        Self::with_dirs(default_base_dirs(), vec![PathBuf::from("/usr/share/pixmaps")], theme)
    }

    pub fn with_dirs(base_dirs: Vec<PathBuf>, pixmap_dirs: Vec<PathBuf>, theme: &str) -> Self {
        let mut themes = Vec::new();
        if !theme.is_empty() {
            themes.push(theme.to_string());
        }
        if theme != FALLBACK_THEME {
            themes.push(FALLBACK_THEME.to_string());
        }
        Self { base_dirs, pixmap_dirs, themes }
    }

    /// Find a themed icon. Scalable SVGs win, then SVGs from sized
    /// directories, then the raster whose nominal size is closest to `size`.
    /// Files that cannot be decoded are skipped.
    pub fn find(&self, name: &str, size: u32) -> Option<IconSource> {
        let themed = self.themes.iter().flat_map(move |theme| {
            self.base_dirs.iter().flat_map(move |base| find_in_theme(&base.join(theme), name, size))
        });
        let pixmaps = self.pixmap_dirs.iter().flat_map(move |dir| {
            ["svg", "png"].into_iter().map(move |ext| dir.join(format!("{}.{}", name, ext)))
        });

        themed.chain(pixmaps.filter(|path| path.is_file())).find_map(|path| {
            match IconSource::from_path(path) {
                Ok(source) => {
                    debug!("Icon '{}' found: {:?}", name, source);
                    Some(source)
                }
                Err(e) => {
                    warn!("{:#}", e);
                    None
                }
            }
        })
    }

    pub fn resolve(&self, spec: &IconSpec, size: u32) -> Result<IconSource> {
        match spec {
            IconSpec::Embedded(name) => embedded(name)
                .map(IconSource::Embedded)
                .ok_or_else(|| anyhow!("No embedded icon named '{}'", name)),
            IconSpec::File(path) => {
                if !path.is_file() {
                    bail!("Icon file {} does not exist", path.display());
                }
                IconSource::from_path(path.clone())
            }
            IconSpec::Named(name) => self
                .find(name, size)
                .ok_or_else(|| anyhow!("Icon '{}' not found in themes {:?}", name, self.themes)),
        }
    }

    pub fn resolve_with_fallback(&self, spec: &IconSpec, size: u32) -> IconSource {
        match self.resolve(spec, size) {
            Ok(source) => return source,
            Err(e) => warn!("{:#}", e),
        }

        for name in [MISSING_ICON, UNKNOWN_ICON] {
            if let Some(source) = self.find(name, size) {
                return source;
            }
        }

        debug!("No themed fallback icon, using bundled '{}'", MISSING_ICON);
        IconSource::Embedded(embedded(MISSING_ICON).unwrap_or_default())
    }

    pub fn load(&self, icon: &str, size: u32) -> Icon {
        self.resolve_with_fallback(&IconSpec::parse(icon), size).into()
    }
}

fn default_base_dirs() -> Vec<PathBuf> {
    let mut base = Vec::new();
    if let Some(data) = dirs::data_dir() {
        base.push(data.join("icons"));
    }
    if let Some(home) = dirs::home_dir() {
        base.push(home.join(".icons"));
    }

    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
    base.extend(data_dirs.split(':').filter(|d| !d.is_empty()).map(|d| Path::new(d).join("icons")));
    base
}

/// Nominal size of an icon theme directory such as `48x48`, `48x48@2` or
/// `scalable`. `None` means scalable.
fn dir_size(name: &str) -> Option<u32> {
    let (width, _) = name.split_once('x')?;
    width.parse().ok()
}

/// Candidate files for `name` inside one theme, best first.
fn find_in_theme(theme_dir: &Path, name: &str, size: u32) -> Vec<PathBuf> {
    let mut ranked: Vec<((u8, u32), PathBuf)> = Vec::new();

    for outer in subdirs(theme_dir) {
        for inner in subdirs(&outer) {
            let names: Vec<&str> = [outer.as_path(), inner.as_path()]
                .into_iter()
                .filter_map(|dir| dir.file_name()?.to_str())
                .collect();

            let svg = inner.join(format!("{}.svg", name));
            if svg.is_file() {
                let rank = if names.contains(&"scalable") { 0 } else { 1 };
                ranked.push(((rank, 0), svg));
            }

            let png = inner.join(format!("{}.png", name));
            if png.is_file() {
                let nominal = names.iter().find_map(|n| dir_size(n)).unwrap_or(u32::MAX);
                ranked.push(((2, nominal.abs_diff(size)), png));
            }
        }
    }

    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, path)| path).collect()
}

fn subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> =
        entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect();
    dirs.sort();
    dirs
}
