//! Synthetic MIDI and sound-tree fixtures.

/// Sound tree used by the preview scenario: one manifest, one include with
/// a three-voice `route101` group.
pub const ROUTE101_GROUP: &str = "\
@ route101 voice group
voice_group route101
\tvoice_directsound 60, 0, DirectSoundWaveData_sc88pro_piano1_48, 255, 252, 0, 239
\tvoice_square_1 60, 0, 0, 2, 0, 0, 15, 0
\tvoice_directsound 60, 0, DirectSoundWaveData_sc88pro_nylon_str_guitar, 255, 246, 0, 226
";

/// Builds one track's event bytes.
#[derive(Debug, Clone, Default)]
pub struct TrackBuilder {
    bytes: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program change on `channel`.
    pub fn program(self, delta: u32, channel: u8, program: u8) -> Self {
        self.event(delta, &[0xC0 | channel, program])
    }

    pub fn note_on(self, delta: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.event(delta, &[0x90 | channel, key, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, key: u8) -> Self {
        self.event(delta, &[0x80 | channel, key, 0])
    }

    /// Data bytes that reuse the previous status byte.
    pub fn running(self, delta: u32, data: &[u8]) -> Self {
        self.event(delta, data)
    }

    /// Meta event of `kind` carrying `data`.
    pub fn meta(mut self, delta: u32, kind: u8, data: &[u8]) -> Self {
        write_vlq(&mut self.bytes, delta);
        self.bytes.extend_from_slice(&[0xFF, kind]);
        write_vlq(&mut self.bytes, data.len() as u32);
        self.bytes.extend_from_slice(data);
        self
    }

    /// Any raw event.
    pub fn event(mut self, delta: u32, bytes: &[u8]) -> Self {
        write_vlq(&mut self.bytes, delta);
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Event bytes followed by an end-of-track meta event.
    pub fn finish(self) -> Vec<u8> {
        self.meta(0, 0x2F, &[]).bytes
    }
}

/// Builds a complete standard MIDI file.
#[derive(Debug, Clone)]
pub struct SmfBuilder {
    format: u16,
    division: u16,
    tracks: Vec<Vec<u8>>,
}

impl Default for SmfBuilder {
    fn default() -> Self {
        Self {
            format: 1,
            division: 96,
            tracks: Vec::new(),
        }
    }
}

impl SmfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: u16) -> Self {
        self.format = format;
        self
    }

    pub fn division(mut self, division: u16) -> Self {
        self.division = division;
        self
    }

    /// Appends a track, closing it with end-of-track.
    pub fn track(mut self, track: TrackBuilder) -> Self {
        self.tracks.push(track.finish());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = b"MThd\x00\x00\x00\x06".to_vec();
        out.extend_from_slice(&self.format.to_be_bytes());
        out.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.division.to_be_bytes());
        for track in &self.tracks {
            out.extend_from_slice(b"MTrk");
            out.extend_from_slice(&(track.len() as u32).to_be_bytes());
            out.extend_from_slice(track);
        }
        out
    }
}

/// Offsets of every program byte in `smf`, paired with the channel.
///
/// Scans track chunks from the header onward. Meta and sysex payloads longer
/// than 127 bytes are not supported.
pub fn program_offsets(smf: &[u8]) -> Vec<(u8, usize)> {
    let mut found = Vec::new();
    let mut pos = 14;
    while pos + 8 <= smf.len() {
        let len = u32::from_be_bytes([smf[pos + 4], smf[pos + 5], smf[pos + 6], smf[pos + 7]]);
        let start = pos + 8;
        let end = start + len as usize;
        let mut i = start;
        let mut running = 0u8;
        while i < end {
            while smf[i] & 0x80 != 0 {
                i += 1;
            }
            i += 1;
            let status = if smf[i] & 0x80 != 0 {
                i += 1;
                smf[i - 1]
            } else {
                running
            };
            match status {
                0xFF => {
                    let data_len = smf[i + 1] as usize;
                    i += 2 + data_len;
                }
                0xF0 | 0xF7 => {
                    let data_len = smf[i] as usize;
                    i += 1 + data_len;
                }
                _ => {
                    running = status;
                    if status & 0xF0 == 0xC0 {
                        found.push((status & 0x0F, i));
                    }
                    i += if matches!(status & 0xF0, 0xC0 | 0xD0) { 1 } else { 2 };
                }
            }
        }
        pos = end;
    }
    found
}

fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut stack = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        stack.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(stack.iter().rev());
}
