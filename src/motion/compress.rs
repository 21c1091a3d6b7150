use crate::types::GestureSegment;

/// Merges runs of adjacent same-direction segments.
///
/// Duration, path length, net displacement and sample count are summed and the
/// mean speed recomputed. Merged records carry a zero direction vector.
pub fn compress_segments<'a, I>(segments: I) -> Vec<GestureSegment>
where
    I: IntoIterator<Item = &'a GestureSegment>,
{
    let mut out: Vec<GestureSegment> = Vec::new();

    for seg in segments {
        match out.last_mut() {
            Some(prev) if prev.direction == seg.direction => {
                prev.end_ts = prev.end_ts.max(seg.end_ts);
                prev.duration += seg.duration;
                prev.path_length += seg.path_length;
                prev.net_dx += seg.net_dx;
                prev.net_dy += seg.net_dy;
                prev.sample_count += seg.sample_count;
                prev.mean_speed = if prev.duration > 0.0 {
                    prev.path_length / prev.duration
                } else {
                    0.0
                };
                prev.dir_x = 0.0;
                prev.dir_y = 0.0;
            }
            _ => out.push(seg.clone()),
        }
    }

    out
}
