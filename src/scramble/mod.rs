//! Image descrambler for server-shuffled chapter pages.
//!
//! Pages of episodes above a fixed id threshold are served sliced into
//! horizontal bands and stacked in reverse order. The band count is a pure
//! function of the episode id and the image filename stem: the last hex
//! character of `md5(<episode_id><stem>)` modulo 6, doubled plus two. The
//! renderer undoes the shuffle with the geometric recipe produced here; this
//! module never touches pixel data.

/// Episode ids at or below this value are served unscrambled.
pub const SCRAMBLE_THRESHOLD: u64 = 10_000;

/// One horizontal slice of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// Vertical offset of the band in the source image, in pixels.
    pub offset: u32,
    /// Band height in pixels.
    pub length: u32,
}

/// A copy instruction mapping a source band to its output position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBand {
    /// Vertical offset in the recomposed image.
    pub dst_offset: u32,
    /// Vertical offset in the scrambled source image.
    pub src_offset: u32,
    /// Band height in pixels.
    pub length: u32,
}

/// Structured recomposition recipe handed to the image renderer.
///
/// Width is never altered; only the vertical band order changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecipe {
    /// Source bands in top-to-bottom order; the last band absorbs the
    /// division remainder.
    pub bands: Vec<Band>,
    /// When true the bands are consumed last-to-first.
    pub reverse_order: bool,
}

impl ImageRecipe {
    /// Expands the recipe into copy instructions in output order.
    #[must_use]
    pub fn output_bands(&self) -> Vec<OutputBand> {
        let ordered: Vec<&Band> = if self.reverse_order {
            self.bands.iter().rev().collect()
        } else {
            self.bands.iter().collect()
        };

        let mut out = Vec::with_capacity(ordered.len());
        let mut dst = 0u32;
        for band in ordered {
            out.push(OutputBand {
                dst_offset: dst,
                src_offset: band.offset,
                length: band.length,
            });
            dst += band.length;
        }
        out
    }
}

/// Computes the band count for a page, or `None` when the page needs no
/// descrambling.
///
/// Episodes at or below [`SCRAMBLE_THRESHOLD`] and `.gif` files (per-band
/// splits would break animation frames) are never descrambled. The decision
/// is deterministic in `(episode_id, filename)`.
#[must_use]
pub fn scramble_bands(episode_id: u64, image_url: &str) -> Option<u32> {
    if episode_id <= SCRAMBLE_THRESHOLD {
        return None;
    }
    if image_url.to_ascii_lowercase().ends_with(".gif") {
        return None;
    }
    let count = band_count(episode_id, image_url);
    if count <= 1 { None } else { Some(count) }
}

/// Derives the raw band count from the keyed hash, without the gif or
/// threshold exemptions.
fn band_count(episode_id: u64, image_url: &str) -> u32 {
    let seed = format!("{episode_id}{}", filename_stem(image_url));
    let digest = format!("{:x}", md5::compute(seed.as_bytes()));
    let last = digest.bytes().last().unwrap_or(b'0');
    let remainder = u32::from(last) % 6;
    remainder * 2 + 2
}

/// Filename stem used in the hash seed: basename up to the first dot.
fn filename_stem(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    name.split('.').next().unwrap_or(name)
}

/// Splits `height` into `band_count` bands and marks them for reverse-order
/// reassembly.
///
/// Each band is `floor(height / band_count)` pixels; the remainder is
/// appended to the last band. A band count of zero or one yields a single
/// full-height band with no reordering.
#[must_use]
pub fn band_layout(height: u32, band_count: u32) -> ImageRecipe {
    if band_count <= 1 || height == 0 {
        return ImageRecipe {
            bands: vec![Band {
                offset: 0,
                length: height,
            }],
            reverse_order: false,
        };
    }

    let block = height / band_count;
    let remainder = height % band_count;
    let mut bands = Vec::with_capacity(band_count as usize);
    for i in 0..band_count {
        let extra = if i == band_count - 1 { remainder } else { 0 };
        bands.push(Band {
            offset: i * block,
            length: block + extra,
        });
    }
    ImageRecipe {
        bands,
        reverse_order: true,
    }
}
