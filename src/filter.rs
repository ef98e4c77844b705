// Framebuffer Filter - indexed-to-color conversion with dither smoothing
//
// Converts the 8-bit indexed framebuffer into packed color, optionally
// blending detected dither patterns (two palette indices alternating in a
// checkerboard) into a smooth intermediate color, and optionally doubling
// pixels 2x for the high-quality stretch mode.
//
// The conversion runs once per frame over the whole framebuffer, so the
// inner loops matter. All functions here are pure transforms: deterministic
// for a given input and color table, no cross-row state.

use crate::color::FramePixel;
use crate::framebuffer::{IndexedFramebuffer, VISIBLE_HEIGHT, VISIBLE_WIDTH};
use crate::palette::ColorTable;

/// A dither stride must span more than this many columns to be blended;
/// anything shorter is treated as noise and left alone.
pub const DITHER_THRESHOLD: usize = 2;

/// Extra flagged columns appended to a committed stride
pub const DITHER_BLEED: usize = 1;

/// Scan one scanline and mark which columns should be blended with their
/// right neighbor
///
/// Walks a 3-pixel sliding window (`prev`, `me`, `next`) and tracks an open
/// dither stride. A position extends the stride when its neighbors match
/// each other but not the middle pixel (the checkerboard signature); a
/// contiguous solid run or a lone mismatched pixel commits and closes the
/// stride. Commits only take effect when the stride is longer than
/// [`DITHER_THRESHOLD`]; a committed stride flags columns
/// `[dither_start, dither_end]` inclusive. The open stride is committed one
/// final time at end of row.
///
/// `smear` must hold at least `row.len()` flags. Flags are written but
/// never cleared here; the blend pass clears each flag as it consumes it.
pub fn filter_dithering_row(row: &[u8], smear: &mut [u8]) {
    let width = row.len();
    debug_assert!(width >= 2);
    debug_assert!(smear.len() >= width);

    fn commit(smear: &mut [u8], start: usize, end: i32) {
        if end < 0 {
            return;
        }
        let length = end as usize - start;
        if length > DITHER_THRESHOLD {
            smear[start..start + length + DITHER_BLEED].fill(1);
        }
    }

    let mut prev: i32 = -1;
    let mut me: i32 = row[0] as i32;

    let mut dither_start: usize = 0;
    let mut dither_end: i32 = -1;

    for x in 0..width - 1 {
        let next = row[x + 1] as i32;

        if me == next || me == prev {
            // contiguous solid color: commit current stride if any
            commit(smear, dither_start, dither_end);
            dither_end = -1;
        } else if prev == next {
            // middle of a dithered stride
            if dither_end < 0 {
                dither_start = x - 1; // start on the left dither pixel
            }
            dither_end = (x + 1) as i32; // extend to the right dither pixel
        } else if x as i32 == dither_end {
            // pixel was consumed as the right edge of the previous window;
            // the next column may show we're still inside the stride
        } else {
            // lone non-dithered pixel
            commit(smear, dither_start, dither_end);
            dither_end = -1;
        }

        prev = me;
        me = next;
    }

    commit(smear, dither_start, dither_end);
}

/// Convert rows `[first_row, first_row + num_rows)` by direct color-table
/// lookup
///
/// `indexed` and `out` both cover at least those rows at `width` pixels per
/// row. Used when the dithering filter is disabled.
pub fn convert_no_filter<P: FramePixel>(
    indexed: &[u8],
    table: &ColorTable,
    out: &mut [P],
    width: usize,
    first_row: usize,
    num_rows: usize,
) {
    let span = first_row * width..(first_row + num_rows) * width;
    assert!(span.end <= indexed.len(), "row range out of bounds");
    assert!(span.end <= out.len(), "output too small for row range");

    let src = &indexed[span.clone()];
    let dst = &mut out[span];

    for (color, &index) in dst.iter_mut().zip(src) {
        *color = P::lookup(table, index);
    }
}

/// Convert rows `[first_row, first_row + num_rows)` with dither smoothing
///
/// Each row is analyzed by [`filter_dithering_row`] into `smear`, then
/// converted: a flagged column outputs the floor-average of its own and its
/// right neighbor's table entries, any other column the direct lookup. The
/// final column never blends (it has no right neighbor). Flags are cleared
/// as they are consumed so the scratch buffer can be reused row after row
/// without separate zeroing.
///
/// `smear` is this caller's private scratch region (at least `width`
/// flags); concurrent callers must not share one.
pub fn convert_with_dithering<P: FramePixel>(
    indexed: &[u8],
    table: &ColorTable,
    out: &mut [P],
    smear: &mut [u8],
    width: usize,
    first_row: usize,
    num_rows: usize,
) {
    let span = first_row * width..(first_row + num_rows) * width;
    assert!(span.end <= indexed.len(), "row range out of bounds");
    assert!(span.end <= out.len(), "output too small for row range");
    assert!(smear.len() >= width, "smear scratch smaller than row width");

    for y in first_row..first_row + num_rows {
        let row = &indexed[y * width..(y + 1) * width];
        let dst = &mut out[y * width..(y + 1) * width];

        filter_dithering_row(row, smear);

        for x in 0..width - 1 {
            if smear[x] != 0 {
                dst[x] = P::blend(table, row[x], row[x + 1]);
                smear[x] = 0; // clear for next row
            } else {
                dst[x] = P::lookup(table, row[x]);
            }
        }

        dst[width - 1] = P::lookup(table, row[width - 1]); // last, never blended
    }
}

/// Expand rows `[first_row, first_row + num_rows)` of `src` 2x in both axes
///
/// Every source pixel becomes a 2x2 block: each pixel is written twice
/// horizontally, then the completed destination row is duplicated below
/// itself. Row coordinates are in source (pre-doubling) space; `dst` is
/// `2 * width` pixels wide.
pub fn double_pixels<P: Copy>(
    src: &[P],
    dst: &mut [P],
    width: usize,
    first_row: usize,
    num_rows: usize,
) {
    assert!((first_row + num_rows) * width <= src.len(), "row range out of bounds");
    assert!(
        (first_row + num_rows) * width * 4 <= dst.len(),
        "output too small for doubled row range"
    );

    let dwidth = width * 2;
    for y in first_row..first_row + num_rows {
        let row = &src[y * width..(y + 1) * width];
        let top = 2 * y * dwidth;

        for (x, &pixel) in row.iter().enumerate() {
            dst[top + 2 * x] = pixel;
            dst[top + 2 * x + 1] = pixel;
        }

        dst.copy_within(top..top + dwidth, top + dwidth);
    }
}

/// Per-worker dither scratch regions, allocated once
///
/// One full row width of flags per worker slot. Splitting hands out
/// disjoint `&mut` regions, so two workers sharing a region is a compile
/// error rather than a data race.
pub struct SmearArena {
    flags: Vec<u8>,
    width: usize,
}

impl SmearArena {
    /// Allocate `workers` scratch regions of `width` flags each
    pub fn new(workers: usize, width: usize) -> Self {
        Self {
            flags: vec![0u8; workers.max(1) * width],
            width,
        }
    }

    /// Number of worker slots
    pub fn workers(&self) -> usize {
        self.flags.len() / self.width
    }

    /// Disjoint mutable scratch regions, one per worker slot
    pub fn regions(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.flags.chunks_exact_mut(self.width)
    }
}

/// Output zoom factor of a frame conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zoom {
    /// 1:1 output
    X1,
    /// 2x pixel-doubled output for the high-quality stretch mode
    X2,
}

impl Zoom {
    /// Linear scale factor
    #[inline]
    pub fn factor(self) -> usize {
        match self {
            Zoom::X1 => 1,
            Zoom::X2 => 2,
        }
    }
}

/// Options for one frame conversion
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Blend detected dither patterns
    pub filter_dithering: bool,
    /// Output zoom factor
    pub zoom: Zoom,
}

/// Whole-frame converter with worker-thread dispatch
///
/// Owns the per-worker smear scratch arena and the intermediate 1x strip
/// buffer used by the 2x path, so the per-frame hot path never allocates.
/// Workers are scoped threads over disjoint row ranges with disjoint
/// output slices; the scope join guarantees every write is visible before
/// `convert_frame` returns, which is the synchronization point the
/// presentation driver relies on before unmapping the transfer buffer.
pub struct FrameConverter<P: FramePixel> {
    workers: usize,
    arena: SmearArena,
    strip: Vec<P>,
}

impl<P: FramePixel> FrameConverter<P> {
    /// Create a converter dispatching over `workers` threads (minimum 1)
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            arena: SmearArena::new(workers, VISIBLE_WIDTH),
            strip: Vec::new(),
        }
    }

    /// Number of worker threads used per frame
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Convert the whole framebuffer into `out`
    ///
    /// `out` must hold exactly the zoomed frame
    /// (`VISIBLE_WIDTH * VISIBLE_HEIGHT * zoom²` pixels). Rows are
    /// partitioned into disjoint ranges, one per worker; output identical
    /// to a single-worker conversion regardless of worker count.
    pub fn convert_frame(
        &mut self,
        fb: &IndexedFramebuffer,
        table: &ColorTable,
        out: &mut [P],
        opts: ConvertOptions,
    ) {
        let zoom = opts.zoom.factor();
        assert_eq!(
            out.len(),
            VISIBLE_WIDTH * VISIBLE_HEIGHT * zoom * zoom,
            "output buffer does not match zoomed frame size"
        );

        if opts.zoom == Zoom::X2 && self.strip.len() < VISIBLE_WIDTH * VISIBLE_HEIGHT {
            self.strip.resize(VISIBLE_WIDTH * VISIBLE_HEIGHT, P::default());
        }

        let indexed = fb.as_slice();

        if self.workers == 1 {
            let mut regions = self.arena.regions();
            let smear = regions.next().expect("arena has at least one region");
            convert_range(
                indexed, table, out, &mut self.strip, smear, opts, 0, VISIBLE_HEIGHT,
            );
            return;
        }

        // Contiguous row slabs, one per worker; every chunk boundary is a
        // row boundary so each worker's output region is contiguous too
        let slab = VISIBLE_HEIGHT.div_ceil(self.workers) * VISIBLE_WIDTH;
        let strip = &mut self.strip;

        std::thread::scope(|scope| match opts.zoom {
            Zoom::X1 => {
                for ((rows, out_chunk), smear) in indexed
                    .chunks(slab)
                    .zip(out.chunks_mut(slab))
                    .zip(self.arena.regions())
                {
                    scope.spawn(move || {
                        let count = rows.len() / VISIBLE_WIDTH;
                        convert_range(rows, table, out_chunk, &mut [], smear, opts, 0, count);
                    });
                }
            }
            Zoom::X2 => {
                for (((rows, out_chunk), strip_chunk), smear) in indexed
                    .chunks(slab)
                    .zip(out.chunks_mut(slab * 4))
                    .zip(strip.chunks_mut(slab))
                    .zip(self.arena.regions())
                {
                    scope.spawn(move || {
                        let count = rows.len() / VISIBLE_WIDTH;
                        convert_range(rows, table, out_chunk, strip_chunk, smear, opts, 0, count);
                    });
                }
            }
        });
    }
}

/// Convert one row range, doubling through `strip` when zoomed
fn convert_range<P: FramePixel>(
    indexed: &[u8],
    table: &ColorTable,
    out: &mut [P],
    strip: &mut [P],
    smear: &mut [u8],
    opts: ConvertOptions,
    first_row: usize,
    num_rows: usize,
) {
    match opts.zoom {
        Zoom::X1 => {
            if opts.filter_dithering {
                convert_with_dithering(
                    indexed, table, out, smear, VISIBLE_WIDTH, first_row, num_rows,
                );
            } else {
                convert_no_filter(indexed, table, out, VISIBLE_WIDTH, first_row, num_rows);
            }
        }
        Zoom::X2 => {
            if opts.filter_dithering {
                convert_with_dithering(
                    indexed, table, strip, smear, VISIBLE_WIDTH, first_row, num_rows,
                );
            } else {
                convert_no_filter(indexed, table, strip, VISIBLE_WIDTH, first_row, num_rows);
            }
            double_pixels(strip, out, VISIBLE_WIDTH, first_row, num_rows);
        }
    }
}
