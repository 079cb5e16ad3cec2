use crate::error::{Error, Result};
use clap::{Parser, ValueEnum};
use std::env;
use std::str::FromStr;

/// Fixed dimensions of a simulated address space: how a logical address is split and how many
/// slots each cache level holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub page_shift: u32,
    pub page_mask: u32,
    pub tlb_size: usize,
    pub num_frames: usize,
    pub frame_size: usize,
    pub num_pages: usize,
    pub page_size: usize,
}

impl Geometry {
    /// 64-byte pages over 64 frames with a 128 slot TLB.
    pub const SMALL: Geometry = Geometry {
        page_shift: 8,
        page_mask: 0x00FF,
        tlb_size: 128,
        num_frames: 64,
        frame_size: 64,
        num_pages: 64,
        page_size: 64,
    };

    /// 256-byte pages over 128 frames with a 16 slot TLB. Physical memory is half the size of the
    /// backing store in this layout.
    pub const STANDARD: Geometry = Geometry {
        page_shift: 8,
        page_mask: 0x00FF,
        tlb_size: 16,
        num_frames: 128,
        frame_size: 256,
        num_pages: 128,
        page_size: 256,
    };

    /// 128-byte pages over 512 frames with a 128 slot TLB.
    pub const LARGE: Geometry = Geometry {
        page_shift: 7,
        page_mask: 0x00FF,
        tlb_size: 128,
        num_frames: 512,
        frame_size: 128,
        num_pages: 512,
        page_size: 128,
    };

    /// Whether a translation cache sits in front of the page table at all.
    pub fn tlb_enabled(&self) -> bool {
        self.tlb_size > 0
    }

    /// Reject layouts the engine cannot run. Frames are never shared between table slots, so the
    /// page table must hold at least one slot per frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.num_frames == 0 {
            return Err(invalid("'num_frames' must be a non-zero value"));
        }
        if self.page_size == 0 {
            return Err(invalid("'page_size' must be a non-zero value"));
        }
        if self.frame_size < self.page_size {
            return Err(invalid("'frame_size' must be at least 'page_size'"));
        }
        if self.num_pages < self.num_frames {
            return Err(invalid("'num_pages' must be at least 'num_frames'"));
        }
        if self.page_mask == 0 {
            return Err(invalid("'page_mask' must be a non-zero value"));
        }
        if self.page_shift >= u32::BITS
            || ((self.num_frames - 1) as u64) << self.page_shift > u64::from(u32::MAX)
        {
            return Err(invalid(
                "'num_frames' shifted by 'page_shift' must fit in a 32-bit physical address",
            ));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig(String::from(message))
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Small,
    Standard,
    Large,
}

impl Preset {
    pub fn geometry(self) -> Geometry {
        match self {
            Preset::Small => Geometry::SMALL,
            Preset::Standard => Geometry::STANDARD,
            Preset::Large => Geometry::LARGE,
        }
    }
}

/// Replacement policy used by the page table.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fifo,
    Lru,
}

/// How the LRU page table picks a frame for a faulting page.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LruFrames {
    /// Reuse the frame of the least recently used entry once every frame is taken.
    LeastRecent,
    /// Hand out frames from a wrapping counter regardless of recency.
    Counter,
}

/// Everything the translation engine needs to know, independent of where addresses and page data
/// come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub geometry: Geometry,
    pub policy: Policy,
    pub lru_frames: LruFrames,
    pub invalidate_tlb: bool,
    pub timed: bool,
}

impl EngineConfig {
    pub fn new(geometry: Geometry, policy: Policy) -> Self {
        Self {
            geometry,
            policy,
            lru_frames: LruFrames::LeastRecent,
            invalidate_tlb: false,
            timed: false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = env_or_default_str("SIM_FILE_ADDRESS", "addresses.txt"))]
    pub file_address: String,

    #[arg(long)]
    pub file_storage: Option<String>,

    #[arg(long)]
    pub file_validation: Option<String>,

    #[arg(long, value_enum, default_value_t = env_or_default_enum("SIM_PRESET", Preset::Standard))]
    pub preset: Preset,

    #[arg(long, value_enum, default_value_t = env_or_default_enum("SIM_POLICY", Policy::Fifo))]
    pub policy: Policy,

    #[arg(long, value_enum, default_value_t = env_or_default_enum("SIM_LRU_FRAMES", LruFrames::LeastRecent))]
    pub lru_frames: LruFrames,

    #[arg(long)]
    pub tlb_size: Option<usize>,

    #[arg(long)]
    pub num_frames: Option<usize>,

    #[arg(long)]
    pub num_pages: Option<usize>,

    #[arg(long)]
    pub frame_size: Option<usize>,

    #[arg(long)]
    pub page_size: Option<usize>,

    #[arg(long)]
    pub page_shift: Option<u32>,

    #[arg(long, value_parser = parse_mask)]
    pub page_mask: Option<u32>,

    /// Clear TLB slots that still point at a page evicted from the page table.
    #[arg(long, default_value_t = env_or_default_bool("SIM_INVALIDATE_TLB"))]
    pub invalidate_tlb: bool,

    /// Suppress the per-address trace.
    #[arg(long, default_value_t = env_or_default_bool("SIM_QUIET"))]
    pub quiet: bool,

    /// Time TLB lookups and report the effective access time.
    #[arg(long, default_value_t = env_or_default_bool("SIM_TIMED"))]
    pub timed: bool,
}

impl Config {
    /// Resolve the preset together with any command line or `SIM_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if an override in the environment is not a valid number.
    pub fn geometry(&self) -> Result<Geometry> {
        let preset = self.preset.geometry();
        Ok(Geometry {
            page_shift: resolve(self.page_shift, "SIM_PAGE_SHIFT", preset.page_shift)?,
            page_mask: match self.page_mask {
                Some(mask) => mask,
                None => match env::var("SIM_PAGE_MASK") {
                    Ok(val) => parse_mask(&val).map_err(Error::InvalidConfig)?,
                    _ => preset.page_mask,
                },
            },
            tlb_size: resolve(self.tlb_size, "SIM_SIZE_TLB", preset.tlb_size)?,
            num_frames: resolve(self.num_frames, "SIM_NUM_FRAMES", preset.num_frames)?,
            frame_size: resolve(self.frame_size, "SIM_SIZE_FRAME", preset.frame_size)?,
            num_pages: resolve(self.num_pages, "SIM_NUM_PAGES", preset.num_pages)?,
            page_size: resolve(self.page_size, "SIM_SIZE_PAGE", preset.page_size)?,
        })
    }

    /// Backing store path, falling back to `SIM_FILE_STORAGE`. `None` runs with zero-filled frames.
    pub fn storage_path(&self) -> Option<String> {
        self.file_storage
            .clone()
            .or_else(|| env::var("SIM_FILE_STORAGE").ok())
    }

    pub fn validation_path(&self) -> Option<String> {
        self.file_validation
            .clone()
            .or_else(|| env::var("SIM_FILE_VALIDATION").ok())
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            geometry: self.geometry()?,
            policy: self.policy,
            lru_frames: self.lru_frames,
            invalidate_tlb: self.invalidate_tlb,
            timed: self.timed,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry()?.validate()
    }

    pub fn display(&self) {
        log::info!("simulation configuration values: {:#?}", self);
        if let Ok(geometry) = self.geometry() {
            log::info!("{:#?}", geometry);
        }
    }
}

fn resolve<T: FromStr>(value: Option<T>, varname: &str, default: T) -> Result<T> {
    if let Some(value) = value {
        return Ok(value);
    }
    match env::var(varname) {
        Ok(val) => val.trim().parse().map_err(|_| {
            Error::InvalidConfig(format!("expected unsigned int for env var: '{}'", varname))
        }),
        _ => Ok(default),
    }
}

/// Accepts both decimal and `0x` prefixed hexadecimal masks.
fn parse_mask(value: &str) -> std::result::Result<u32, String> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| format!("expected a decimal or hexadecimal mask, found '{}'", value))
}

fn env_or_default_str(varname: &str, default: &str) -> String {
    match env::var(varname) {
        Ok(val) => val,
        _ => String::from(default),
    }
}

/// Flags set through the environment accept the usual spellings, in any case.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_or_default_bool(varname: &str) -> bool {
    match env::var(varname) {
        Ok(val) => parse_flag(&val).unwrap_or_else(|| {
            log::warn!("ignoring unrecognised value '{}' for env var: '{}'", val, varname);
            false
        }),
        _ => false,
    }
}

fn env_or_default_enum<T: ValueEnum>(varname: &str, default: T) -> T {
    match env::var(varname) {
        Ok(val) => T::from_str(&val, true).unwrap_or_else(|_| {
            log::warn!("ignoring unrecognised value '{}' for env var: '{}'", val, varname);
            default
        }),
        _ => default,
    }
}
