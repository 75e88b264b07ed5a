//! GIF container metadata scanning
//!
//! Walks the block structure of a GIF stream without decompressing any
//! image data, collecting the properties the classifier and decoder need.

const HEADER_LEN: usize = 13;

const EXTENSION: u8 = 0x21;
const IMAGE_DESCRIPTOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

const GRAPHIC_CONTROL: u8 = 0xF9;
const APPLICATION: u8 = 0xFF;

/// Per-frame properties read from the image descriptor and its
/// preceding Graphic Control Extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    /// Delay in hundredths of a second, if a Graphic Control Extension was present
    pub delay_cs: Option<u16>,
}

/// Animation properties of a GIF stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifMetadata {
    pub width: u16,
    pub height: u16,
    /// NETSCAPE2.0 loop count, 0 meaning forever
    pub loop_count: Option<u16>,
    pub frames: Vec<FrameInfo>,
    /// False when the stream ended before the trailer
    pub complete: bool,
}

impl GifMetadata {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn first_frame_delay(&self) -> Option<u16> {
        self.frames.first().and_then(|f| f.delay_cs)
    }

    /// True when frame count, loop count and current-frame duration can all be read
    pub fn has_animation_metadata(&self) -> bool {
        self.frame_count() > 0 && self.loop_count.is_some() && self.first_frame_delay().is_some()
    }
}

/// Check GIF magic bytes
pub fn is_gif(data: &[u8]) -> bool {
    data.len() >= 6 && (&data[0..6] == b"GIF89a" || &data[0..6] == b"GIF87a")
}

/// Scan a GIF stream. Returns `None` if the data is not a GIF.
///
/// Truncated or malformed streams return what was found before the damage,
/// with `complete` set to false.
pub fn scan(data: &[u8]) -> Option<GifMetadata> {
    if data.len() < HEADER_LEN || !is_gif(data) {
        return None;
    }

    let mut meta = GifMetadata {
        width: read_u16(data, 6)?,
        height: read_u16(data, 8)?,
        loop_count: None,
        frames: Vec::new(),
        complete: false,
    };

    let mut i = HEADER_LEN;

    // Skip Global Color Table if present
    let flags = data[10];
    if flags & 0x80 != 0 {
        i += color_table_len(flags);
    }

    let mut pending_delay = None;

    while i < data.len() {
        match data[i] {
            EXTENSION => {
                let Some(&label) = data.get(i + 1) else { break };
                let body = i + 2;

                match label {
                    GRAPHIC_CONTROL => {
                        // Block size 4: packed fields, delay (LE), transparent index
                        if data.get(body) == Some(&4) {
                            pending_delay = read_u16(data, body + 2);
                        }
                    }
                    APPLICATION => {
                        if let Some(count) = read_loop_extension(data, body) {
                            meta.loop_count = Some(count);
                        }
                    }
                    _ => {}
                }

                match skip_sub_blocks(data, body) {
                    Some(next) => i = next,
                    None => break,
                }
            }
            IMAGE_DESCRIPTOR => {
                if i + 10 > data.len() {
                    break;
                }

                let (Some(left), Some(top), Some(width), Some(height)) = (
                    read_u16(data, i + 1),
                    read_u16(data, i + 3),
                    read_u16(data, i + 5),
                    read_u16(data, i + 7),
                ) else {
                    break;
                };

                meta.frames.push(FrameInfo {
                    left,
                    top,
                    width,
                    height,
                    delay_cs: pending_delay.take(),
                });

                let local_flags = data[i + 9];
                i += 10;

                // Skip Local Color Table if present
                if local_flags & 0x80 != 0 {
                    i += color_table_len(local_flags);
                }

                // Skip LZW minimum code size
                i += 1;

                match skip_sub_blocks(data, i) {
                    Some(next) => i = next,
                    None => break,
                }
            }
            TRAILER => {
                meta.complete = true;
                break;
            }
            other => {
                log::debug!("Unknown GIF block introducer 0x{:02X} at offset {}", other, i);
                break;
            }
        }
    }

    Some(meta)
}

fn color_table_len(flags: u8) -> usize {
    3 * (1 << ((flags & 0x07) + 1))
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Skip a chain of data sub-blocks starting at `i`, returning the offset
/// just past the block terminator
fn skip_sub_blocks(data: &[u8], mut i: usize) -> Option<usize> {
    loop {
        let size = *data.get(i)? as usize;
        i += 1;
        if size == 0 {
            return Some(i);
        }
        i += size;
    }
}

/// Read the repetition count from a NETSCAPE2.0 (or ANIMEXTS1.0) application extension
fn read_loop_extension(data: &[u8], body: usize) -> Option<u16> {
    if *data.get(body)? != 11 {
        return None;
    }
    let identifier = data.get(body + 1..body + 12)?;
    if identifier != b"NETSCAPE2.0" && identifier != b"ANIMEXTS1.0" {
        return None;
    }

    // Sub-block: size 3, id 1, loop count (LE)
    let sub = body + 12;
    if data.get(sub) != Some(&3) || data.get(sub + 1) != Some(&1) {
        return None;
    }
    read_u16(data, sub + 2)
}
