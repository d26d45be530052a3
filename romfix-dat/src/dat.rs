use std::io::{BufRead, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DatError;

/// A parsed catalog source (MAME `-listxml`, Logiqx XML or ClrMamePro).
///
/// Digests are kept as the raw strings found in the document; they are
/// validated when the [`Catalog`](crate::Catalog) is built.
#[derive(Debug, Clone, Default)]
pub struct DatFile {
    pub name: String,
    pub description: String,
    pub version: String,
    pub sets: Vec<DatSet>,
}

/// A single set ("game" / "machine") record.
#[derive(Debug, Clone, Default)]
pub struct DatSet {
    pub name: String,
    pub description: String,
    /// Parent set this one is a clone of.
    pub cloneof: Option<String>,
    /// Set whose ROMs this one borrows (the parent for clones, the bios for parents).
    pub romof: Option<String>,
    pub roms: Vec<DatRom>,
}

/// A single ROM record within a set.
#[derive(Debug, Clone, Default)]
pub struct DatRom {
    pub name: String,
    pub size: u64,
    /// CRC32 as hex, absent for `nodump` entries
    pub crc: Option<String>,
    /// SHA1 as hex, if present
    pub sha1: Option<String>,
    /// Dump status (`good`, `baddump`, `nodump`, `verified`), if present
    pub status: Option<String>,
}

/// Parse a catalog source, auto-detecting format (XML or ClrMamePro).
pub fn parse_dat<R: BufRead>(mut reader: R) -> Result<DatFile, DatError> {
    // Peek at the first non-whitespace byte to detect the format
    let mut first_bytes = Vec::new();
    let mut buf = [0u8; 1];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Err(DatError::invalid_dat("Empty DAT file"));
        }
        first_bytes.push(buf[0]);
        if !buf[0].is_ascii_whitespace() {
            break;
        }
    }

    let chain = std::io::Cursor::new(first_bytes).chain(reader);
    let buffered = std::io::BufReader::new(chain);

    if buf[0] == b'<' {
        parse_xml(buffered)
    } else {
        parse_clrmamepro(buffered)
    }
}

/// Parse a catalog source from a file path.
pub fn parse_dat_file(path: &std::path::Path) -> Result<DatFile, DatError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    parse_dat(reader)
}

fn push_set(dat: &mut DatFile, set: DatSet) -> Result<(), DatError> {
    if set.name.is_empty() {
        return Err(DatError::invalid_dat(format!(
            "set without a name (after {:?})",
            dat.sets.last().map(|s| s.name.as_str()).unwrap_or("start of file")
        )));
    }
    dat.sets.push(set);
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

// ---------------------------------------------------------------------------
// XML parser (MAME listxml and Logiqx)
// ---------------------------------------------------------------------------

fn is_set_tag(tag: &[u8]) -> bool {
    matches!(tag, b"game" | b"machine")
}

fn parse_xml<R: BufRead>(reader: R) -> Result<DatFile, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut dat = DatFile::default();

    let mut in_header = false;
    let mut current_tag = String::new();
    let mut current_set: Option<DatSet> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"header" => in_header = true,
                b"mame" => {
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"build" {
                            dat.version = String::from_utf8_lossy(&attr.value).into_owned();
                        }
                    }
                }
                tag if is_set_tag(tag) => current_set = Some(parse_set_attributes(e)?),
                b"rom" => {
                    if let Some(ref mut set) = current_set {
                        set.roms.push(parse_xml_rom_attributes(e)?);
                    }
                }
                other => current_tag = String::from_utf8_lossy(other).into_owned(),
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"rom" => {
                    if let Some(ref mut set) = current_set {
                        set.roms.push(parse_xml_rom_attributes(e)?);
                    }
                }
                // A set with no child elements at all
                tag if is_set_tag(tag) => push_set(&mut dat, parse_set_attributes(e)?)?,
                _ => {}
            },
            Event::Text(ref e) => {
                let text = e.unescape()?.into_owned();
                if in_header {
                    match current_tag.as_str() {
                        "name" => dat.name = text,
                        "description" => dat.description = text,
                        "version" => dat.version = text,
                        _ => {}
                    }
                } else if let Some(ref mut set) = current_set {
                    if current_tag == "description" {
                        set.description = text;
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"header" => in_header = false,
                tag if is_set_tag(tag) => {
                    if let Some(set) = current_set.take() {
                        push_set(&mut dat, set)?;
                    }
                }
                _ => current_tag.clear(),
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if dat.name.is_empty() && dat.sets.is_empty() {
        return Err(DatError::invalid_dat(
            "No header or sets found in XML DAT file",
        ));
    }

    Ok(dat)
}

fn parse_set_attributes(e: &BytesStart<'_>) -> Result<DatSet, DatError> {
    let mut set = DatSet::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => set.name = value,
            b"cloneof" => set.cloneof = non_empty(value),
            b"romof" => set.romof = non_empty(value),
            _ => {}
        }
    }
    Ok(set)
}

fn parse_xml_rom_attributes(e: &BytesStart<'_>) -> Result<DatRom, DatError> {
    let mut rom = DatRom::default();

    for attr in e.attributes() {
        let attr = attr?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => rom.name = value,
            b"size" => rom.size = parse_size(&value)?,
            b"crc" => rom.crc = non_empty(value),
            b"sha1" => rom.sha1 = non_empty(value),
            b"status" => rom.status = non_empty(value),
            _ => {}
        }
    }

    Ok(rom)
}

fn parse_size(value: &str) -> Result<u64, DatError> {
    value
        .trim()
        .parse()
        .map_err(|_| DatError::invalid_dat(format!("Invalid ROM size: {value}")))
}

// ---------------------------------------------------------------------------
// ClrMamePro parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Header,
    Set,
    Other,
}

/// Parse a ClrMamePro format DAT file.
///
/// Format:
/// ```text
/// clrmamepro (
///     name "MAME"
///     version 0.153
/// )
///
/// game (
///     name "puckman"
///     cloneof "pacman"
///     romof "pacman"
///     rom ( name pm1-1.7f size 4096 crc c1e6ab10 sha1 e87e059c5be45753f7e9f33dff851f16d6751181 )
///     rom ( name pm1-2.7j size 4096 flags nodump )
/// )
/// ```
fn parse_clrmamepro<R: BufRead>(reader: R) -> Result<DatFile, DatError> {
    let mut dat = DatFile::default();
    let mut block: Option<Block> = None;
    let mut current_set: Option<DatSet> = None;

    for (line_index, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(kind) = block else {
            if let Some(kind) = detect_block_start(trimmed) {
                if kind == Block::Set {
                    current_set = Some(DatSet::default());
                }
                block = Some(kind);
            }
            continue;
        };

        if trimmed == ")" {
            if let Some(set) = current_set.take() {
                push_set(&mut dat, set)?;
            }
            block = None;
            continue;
        }

        let Some((key, value)) = parse_kv(trimmed) else {
            continue;
        };
        match kind {
            Block::Header => match key.as_str() {
                "name" => dat.name = value,
                "description" => dat.description = value,
                "version" => dat.version = value,
                _ => {}
            },
            Block::Set => {
                if let Some(ref mut set) = current_set {
                    match key.as_str() {
                        "name" => set.name = value,
                        "description" => set.description = value,
                        "cloneof" => set.cloneof = non_empty(value),
                        "romof" => set.romof = non_empty(value),
                        "rom" => {
                            let rom = parse_clr_rom_inline(&value).map_err(|e| match e {
                                DatError::InvalidDat(msg) => {
                                    DatError::invalid_dat(format!("line {}: {msg}", line_index + 1))
                                }
                                other => other,
                            })?;
                            if let Some(rom) = rom {
                                set.roms.push(rom);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Block::Other => {}
        }
    }

    if dat.name.is_empty() && dat.sets.is_empty() {
        return Err(DatError::invalid_dat(
            "No header or sets found in ClrMamePro DAT file",
        ));
    }

    Ok(dat)
}

/// Detect a block start like `clrmamepro (` or `game (`.
fn detect_block_start(line: &str) -> Option<Block> {
    let block_type = line.strip_suffix('(')?.trim();
    if block_type.is_empty() || !block_type.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(match block_type.to_lowercase().as_str() {
        "clrmamepro" => Block::Header,
        "game" | "machine" | "resource" => Block::Set,
        _ => Block::Other,
    })
}

/// Parse a key-value line like `name "Some Value"` or `version 0.153`.
/// For `rom ( ... )` lines, the value is the content inside the parens.
fn parse_kv(line: &str) -> Option<(String, String)> {
    if let Some(rest) = line.strip_prefix("rom") {
        let rest = rest.trim();
        if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            return Some(("rom".to_string(), inner.trim().to_string()));
        }
    }

    let (key, raw_value) = line.split_once(|c: char| c.is_ascii_whitespace())?;
    let raw_value = raw_value.trim();
    let value = raw_value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw_value);

    Some((key.to_string(), value.to_string()))
}

/// Parse an inline ROM entry like:
/// `name "pm1-1.7f" size 4096 crc c1e6ab10 sha1 … flags baddump`
fn parse_clr_rom_inline(inner: &str) -> Result<Option<DatRom>, DatError> {
    let tokens = tokenize_rom_line(inner);
    let mut rom = DatRom::default();

    for pair in tokens.chunks(2) {
        let [key, value] = pair else {
            break;
        };
        match key.as_str() {
            "name" => rom.name = value.clone(),
            "size" => rom.size = parse_size(value)?,
            "crc" => rom.crc = non_empty(value.clone()),
            "sha1" => rom.sha1 = non_empty(value.clone()),
            "flags" | "status" => rom.status = non_empty(value.clone()),
            _ => {}
        }
    }

    if rom.name.is_empty() {
        return Ok(None);
    }
    Ok(Some(rom))
}

/// Tokenize a ROM line, respecting quoted strings.
/// `name "a b.bin" size 12` → ["name", "a b.bin", "size", "12"]
fn tokenize_rom_line(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut token = String::new();
        if first == '"' {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_ascii_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    tokens
}

#[cfg(test)]
#[path = "tests/dat_tests.rs"]
mod tests;
