/// Half-open `[start, end)` character spans covering `len` characters.
///
/// Full windows of `size` are taken, advancing by `stride`, until fewer than
/// `size` characters remain; the remainder becomes one final span. A
/// zero-length input yields no spans. `stride` must be in `1..=size`.
pub fn window_spans(len: usize, size: usize, stride: usize) -> Vec<(usize, usize)> {
    if len == 0 || size == 0 || stride == 0 {
        return Vec::new();
    }

    let mut spans = Vec::with_capacity(len.div_ceil(stride));
    let mut start = 0;
    while len - start >= size {
        spans.push((start, start + size));
        start += stride;
        if start >= len {
            return spans;
        }
    }
    spans.push((start, len));
    spans
}
