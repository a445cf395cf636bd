//! Minimal Standard MIDI File walker.
//!
//! Walks chunks and track events by byte offset without decoding them into an
//! owned model, so callers can patch individual data bytes in place and leave
//! every other byte (running status, deltas, meta and sysex payloads, unknown
//! chunks) exactly as it was.

use crate::error::{MidiError, MidiResult};
use crate::validate::check_signature;

/// Decoded `MThd` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// SMF format (0, 1, or 2).
    pub format: u16,
    /// Track count declared in the header.
    pub tracks: u16,
    /// Raw time-division word (ticks per beat when the top bit is clear).
    pub division: u16,
}

impl Header {
    /// Ticks per quarter note, or `None` for SMPTE time division.
    pub fn ticks_per_beat(&self) -> Option<u16> {
        (self.division & 0x8000 == 0).then_some(self.division)
    }
}

/// A chunk located inside the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub id: [u8; 4],
    /// Offset of the first payload byte.
    pub start: usize,
    pub len: usize,
}

impl Chunk {
    pub fn is_track(&self) -> bool {
        &self.id == b"MTrk"
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One track event as seen by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A channel voice message. `data` is the offset of its first data byte.
    Channel { status: u8, data: usize },
    /// A meta event (`FF type len data`).
    Meta { kind: u8 },
    /// A sysex or escape event (`F0`/`F7 len data`).
    SysEx,
}

impl Event {
    /// For a program change, returns `(channel, offset of the program byte)`.
    pub fn program_change(&self) -> Option<(u8, usize)> {
        match *self {
            Event::Channel { status, data } if status & 0xF0 == 0xC0 => {
                Some((status & 0x0F, data))
            }
            _ => None,
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], pos: usize, end: usize) -> Self {
        Self { data, pos, end }
    }

    fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn u8(&mut self) -> MidiResult<u8> {
        if self.pos >= self.end {
            return Err(MidiError::malformed(self.pos, "unexpected end of data"));
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn peek(&self) -> MidiResult<u8> {
        if self.pos >= self.end {
            return Err(MidiError::malformed(self.pos, "unexpected end of data"));
        }
        Ok(self.data[self.pos])
    }

    fn u16(&mut self) -> MidiResult<u16> {
        Ok(u16::from_be_bytes([self.u8()?, self.u8()?]))
    }

    fn u32(&mut self) -> MidiResult<u32> {
        Ok(u32::from_be_bytes([
            self.u8()?,
            self.u8()?,
            self.u8()?,
            self.u8()?,
        ]))
    }

    /// Variable-length quantity, at most four bytes.
    fn vlq(&mut self) -> MidiResult<u32> {
        let start = self.pos;
        let mut value = 0u32;
        for _ in 0..4 {
            let byte = self.u8()?;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(MidiError::malformed(start, "variable-length quantity exceeds 4 bytes"))
    }

    fn skip(&mut self, len: usize) -> MidiResult<()> {
        if len > self.remaining() {
            return Err(MidiError::malformed(
                self.pos,
                format!("{} byte payload runs past end of chunk", len),
            ));
        }
        self.pos += len;
        Ok(())
    }
}

/// Parses the `MThd` chunk. Returns the header and the offset just past it.
pub fn parse_header(data: &[u8]) -> MidiResult<(Header, usize)> {
    check_signature(data)?;
    let mut reader = Reader::new(data, 4, data.len());
    let len = reader.u32()? as usize;
    if len < 6 {
        return Err(MidiError::malformed(4, format!("header length {} is below 6", len)));
    }
    let body = reader.pos;
    let header = Header {
        format: reader.u16()?,
        tracks: reader.u16()?,
        division: reader.u16()?,
    };
    reader.pos = body;
    reader.skip(len)?;
    Ok((header, reader.pos))
}

/// Locates every chunk after the header, in file order.
///
/// Fewer than eight trailing bytes (padding some writers leave behind) are ignored.
pub fn chunks(data: &[u8], from: usize) -> MidiResult<Vec<Chunk>> {
    let mut reader = Reader::new(data, from, data.len());
    let mut found = Vec::new();
    while reader.remaining() >= 8 {
        let id = [reader.u8()?, reader.u8()?, reader.u8()?, reader.u8()?];
        let len = reader.u32()? as usize;
        let start = reader.pos;
        reader.skip(len)?;
        found.push(Chunk { id, start, len });
    }
    Ok(found)
}

/// Walks every event in a track chunk, calling `visit` with each one.
///
/// Running status is honoured for channel messages; meta and sysex events
/// leave the running status untouched.
pub fn walk_track<F>(data: &[u8], chunk: &Chunk, mut visit: F) -> MidiResult<()>
where
    F: FnMut(Event) -> MidiResult<()>,
{
    let mut reader = Reader::new(data, chunk.start, chunk.end());
    let mut running: Option<u8> = None;

    while reader.remaining() > 0 {
        reader.vlq()?;
        let status_pos = reader.pos;
        let status = if reader.peek()? & 0x80 != 0 {
            reader.u8()?
        } else {
            running.ok_or_else(|| {
                MidiError::malformed(status_pos, "data byte without running status")
            })?
        };

        let event = match status {
            0xFF => {
                let kind = reader.u8()?;
                let len = reader.vlq()? as usize;
                reader.skip(len)?;
                Event::Meta { kind }
            }
            0xF0 | 0xF7 => {
                let len = reader.vlq()? as usize;
                reader.skip(len)?;
                Event::SysEx
            }
            0x80..=0xEF => {
                running = Some(status);
                let data_pos = reader.pos;
                let data_len = match status & 0xF0 {
                    0xC0 | 0xD0 => 1,
                    _ => 2,
                };
                for _ in 0..data_len {
                    if reader.u8()? & 0x80 != 0 {
                        return Err(MidiError::malformed(
                            reader.pos - 1,
                            format!("status byte inside data of event 0x{:02X}", status),
                        ));
                    }
                }
                Event::Channel {
                    status,
                    data: data_pos,
                }
            }
            other => {
                return Err(MidiError::malformed(
                    status_pos,
                    format!("unexpected status byte 0x{:02X} in track", other),
                ))
            }
        };
        visit(event)?;
    }
    Ok(())
}
