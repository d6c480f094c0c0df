//! Random-access application of accumulated edits. Both patchers verify
//! the bytes on disk against what the matching pass recorded before
//! overwriting anything, so a file that changed in between is refused
//! rather than corrupted.

use crate::chunk::Chunk;
use crate::value;
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};

/// Fails with `UnresolvedPattern` when any requested pattern matched
/// nothing. Called before any byte is written.
pub fn check_resolved(unmatched: &[&str]) -> Result<()> {
    if unmatched.is_empty() {
        Ok(())
    } else {
        Err(Error::UnresolvedPattern(unmatched.join(", ")))
    }
}

/// Applies value assignments at the offsets the matcher recorded. Only the
/// first matched configuration of each pattern is patched. The four prefix
/// bytes (size, res0, data type) must equal the encoded record's prefix;
/// the four data bytes are then overwritten in place.
pub fn apply_value_edits<F: Read + Write + Seek>(
    file: &mut F,
    assignments: &[(String, String)],
    matches: &HashMap<String, Vec<u64>>,
) -> Result<()> {
    for (name, new_value) in assignments {
        let Some(&offset) = matches.get(name).and_then(|offsets| offsets.first()) else {
            continue;
        };
        let record = value::encode_patch(name, new_value)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut prefix = [0u8; 4];
        file.read_exact(&mut prefix)?;
        if prefix[..] != record[..4] {
            return Err(Error::PatchMismatch { offset });
        }
        file.write_all(&record[4..])?;
        tracing::info!("{offset}: {name}={new_value}");
    }
    Ok(())
}

/// Rewrites the `total_size` of each changed chunk. The chunk's type and
/// header size on disk must still match what was decoded.
pub fn apply_resize_edits<F: Read + Write + Seek>(
    file: &mut F,
    changes: impl IntoIterator<Item = Chunk>,
) -> Result<()> {
    for chunk in changes {
        tracing::info!("resizing {chunk}");
        file.seek(SeekFrom::Start(chunk.offset))?;
        let ty = file.read_u16::<LittleEndian>()?;
        let header_size = file.read_u16::<LittleEndian>()?;
        if ty != chunk.ty || header_size != chunk.header_size {
            return Err(Error::PatchMismatch {
                offset: chunk.offset,
            });
        }
        file.write_u32::<LittleEndian>(chunk.total_size)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ResourceDecoder;
    use crate::event::{ContentSink, NullSink};
    use crate::stream::ResourceStream;
    use crate::table::{TableAttributeMatcher, TableToDocument};
    use crate::testutil::{manifest_fixture, multi_config_table_fixture, table_fixture};
    use crate::xml::{XmlElementMatcher, XmlToDocument};
    use std::io::Cursor;

    fn decode_into<S: ContentSink>(bytes: &[u8], sink: &mut S) {
        let mut decoder = ResourceDecoder::new(sink);
        let mut stream = ResourceStream::new(Cursor::new(bytes));
        while decoder.decode(&mut stream).unwrap().is_some() {}
    }

    fn match_table(bytes: &[u8], patterns: &[&str]) -> TableAttributeMatcher<NullSink> {
        let mut matcher =
            TableAttributeMatcher::new(patterns.iter().map(|p| p.to_string()), NullSink);
        decode_into(bytes, &mut matcher);
        matcher
    }

    fn dump_value(bytes: &[u8], type_index: usize) -> String {
        let mut sink = TableToDocument::new(NullSink);
        decode_into(bytes, &mut sink);
        let root = sink.document().expect("document").root().clone();
        let package = root.elements().next().expect("package");
        let restype = package.elements().nth(type_index).expect("resourcetype");
        let item = restype
            .elements()
            .next()
            .and_then(|config| config.elements().next())
            .expect("item");
        item.attribute("value").expect("value").to_string()
    }

    #[test]
    fn bool_edit_and_inverse_restore_the_file() {
        let original = table_fixture();
        let matcher = match_table(&original, &["R.bool.checked"]);
        assert!(matcher.unmatched().is_empty());

        let mut file = Cursor::new(original.clone());
        let assignment = [("R.bool.checked".to_string(), "false".to_string())];
        apply_value_edits(&mut file, &assignment, matcher.matches()).unwrap();
        let patched = file.into_inner();
        assert_ne!(patched, original);
        assert_eq!(dump_value(&patched, 0), "false");

        let matcher = match_table(&patched, &["R.bool.checked"]);
        let mut file = Cursor::new(patched);
        let inverse = [("R.bool.checked".to_string(), "true".to_string())];
        apply_value_edits(&mut file, &inverse, matcher.matches()).unwrap();
        assert_eq!(file.into_inner(), original);
    }

    #[test]
    fn color_edit() {
        let bytes = table_fixture();
        let matcher = match_table(&bytes, &["R.color.background"]);
        let mut file = Cursor::new(bytes);
        let assignment = [("R.color.background".to_string(), "#11223344".to_string())];
        apply_value_edits(&mut file, &assignment, matcher.matches()).unwrap();
        assert_eq!(dump_value(&file.into_inner(), 1), "#11223344");
    }

    #[test]
    fn only_the_first_configuration_is_patched() {
        // the same bool entry in two configurations, both true
        let original = multi_config_table_fixture(&[0xffff_ffff, 0xffff_ffff]);
        let matcher = match_table(&original, &["R.bool.checked"]);
        assert!(matcher.unmatched().is_empty());
        let offsets = &matcher.matches()["R.bool.checked"];
        assert_eq!(offsets.len(), 2);

        let mut file = Cursor::new(original.clone());
        let assignment = [("R.bool.checked".to_string(), "false".to_string())];
        apply_value_edits(&mut file, &assignment, matcher.matches()).unwrap();
        let patched = file.into_inner();

        let first = offsets[0] as usize;
        let second = offsets[1] as usize;
        assert_eq!(patched[first + 4..first + 8], [0, 0, 0, 0]);
        assert_eq!(patched[second..second + 8], original[second..second + 8]);
        assert_eq!(patched[second + 4..second + 8], [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn type_mismatch_leaves_the_file_untouched() {
        let original = table_fixture();
        let matcher = match_table(&original, &["R.bool.checked"]);
        // claim the bool offsets belong to a color pattern
        let matches: HashMap<String, Vec<u64>> = matcher
            .matches()
            .values()
            .map(|offsets| ("R.color.checked".to_string(), offsets.clone()))
            .collect();
        let mut file = Cursor::new(original.clone());
        let assignment = [("R.color.checked".to_string(), "#11223344".to_string())];
        let err = apply_value_edits(&mut file, &assignment, &matches).unwrap_err();
        assert!(matches!(err, Error::PatchMismatch { .. }));
        assert_eq!(file.into_inner(), original);
    }

    #[test]
    fn unmatched_patterns_are_refused() {
        let matcher = match_table(&table_fixture(), &["R.bool.checked", "R.bool.missing"]);
        let err = check_resolved(&matcher.unmatched()).unwrap_err();
        match err {
            Error::UnresolvedPattern(list) => assert_eq!(list, "R.bool.missing"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(check_resolved(&[]).is_ok());
    }

    #[test]
    fn element_removal_is_idempotent() {
        let original = manifest_fixture();
        let selector = "application[android:debuggable=true]".to_string();
        let mut matcher = XmlElementMatcher::new([selector.clone()], NullSink).unwrap();
        decode_into(&original, &mut matcher);
        assert_eq!(matcher.changes().len(), 1);

        let mut file = Cursor::new(original.clone());
        apply_resize_edits(&mut file, matcher.changes().iter().copied()).unwrap();
        let patched = file.into_inner();
        assert_eq!(patched.len(), original.len());

        let mut reread = XmlToDocument::new(NullSink);
        decode_into(&patched, &mut reread);
        let root = reread.document().expect("document").root().clone();
        assert_eq!(root.elements().count(), 0);

        // the element is gone, so a second pass has nothing to change
        let mut again = XmlElementMatcher::new([selector], NullSink).unwrap();
        decode_into(&patched, &mut again);
        assert!(again.changes().is_empty());
    }

    #[test]
    fn stale_resize_edit_is_refused() {
        let original = manifest_fixture();
        let mut matcher = XmlElementMatcher::new(
            ["application[android:debuggable=true]".to_string()],
            NullSink,
        )
        .unwrap();
        decode_into(&original, &mut matcher);
        let mut change = *matcher.changes().iter().next().unwrap();
        change.offset += 2; // no chunk header here
        let mut file = Cursor::new(original.clone());
        let err = apply_resize_edits(&mut file, [change]).unwrap_err();
        assert!(matches!(err, Error::PatchMismatch { .. }));
        assert_eq!(file.into_inner(), original);
    }
}
