/*
 * Loads dialog templates from a resource store and rewrites them in memory
 * before the dialog is created, so one template serves both layout
 * directions and every font variant.
 *
 * The layout patch handles both header formats; the classic one starts with
 * u32 style, u32 exStyle. Font replacement needs the extended format, whose
 * header is:
 *
 *   u16 dlgVer, u16 signature (0xFFFF), u32 helpID, u32 exStyle, u32 style,
 *   u16 cDlgItems, i16 x, i16 y, i16 cx, i16 cy           (26 bytes)
 *   menu, windowClass, title                              (sz_Or_Ord each)
 *   u16 pointsize, u16 weight, u8 italic, u8 charset,
 *   typeface                                              (if DS_SETFONT)
 *
 * followed by the item templates, each starting on a DWORD boundary. The
 * length of the typeface therefore determines where the items start, and
 * replacing it means moving the whole remainder of the buffer.
 */
use crate::config::DialogConfig;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::DialogId;

use std::borrow::Cow;
use std::collections::HashMap;

const SIGNATURE_OFFSET: usize = 2;
const EX_STYLE_OFFSET: usize = 8;
const STYLE_OFFSET: usize = 12;
const HEADER_LEN: usize = 26;
const CLASSIC_EX_STYLE_OFFSET: usize = 4;
const CLASSIC_HEADER_LEN: usize = 18;
/// pointsize, weight, italic and charset precede the typeface.
const FONT_METRICS_LEN: usize = 6;
const EXTENDED_SIGNATURE: u16 = 0xFFFF;

const DS_SETFONT: u32 = 0x40;
pub const WS_EX_APPWINDOW: u32 = 0x0004_0000;
pub const WS_EX_LAYOUTRTL: u32 = 0x0040_0000;

/// Read-only source of raw dialog templates.
pub trait TemplateStore {
    fn lookup(&self, id: DialogId) -> Option<Cow<'_, [u8]>>;
}

impl TemplateStore for HashMap<DialogId, Vec<u8>> {
    fn lookup(&self, id: DialogId) -> Option<Cow<'_, [u8]>> {
        self.get(&id).map(|bytes| Cow::Borrowed(bytes.as_slice()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontPatch {
    /// The typeface was replaced; the remainder moved left by `delta` bytes
    /// (negative when the fallback is longer).
    Replaced { delta: isize },
    /// Preferred and fallback fonts are the same.
    Unchanged,
    /// The template does not use the preferred font.
    NotFound,
}

/// Decides whether the fallback font has to be spliced in.
#[derive(Debug, Clone, Copy)]
pub struct FontPolicy;

impl FontPolicy {
    /*
     * The symbol font renders the one script the plain UI font cannot, but
     * breaks others, so it is kept only when it is installed and that script
     * is the active locale.
     */
    pub fn should_substitute(symbol_font_available: bool, config: &DialogConfig) -> bool {
        !(symbol_font_available && config.uses_symbol_font_locale())
    }
}

/// Owned, mutable copy of a dialog template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTemplate {
    id: DialogId,
    bytes: Vec<u8>,
}

fn align_dword(offset: usize) -> usize {
    (offset + 3) & !3
}

fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    bytes
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Offset just past the NUL of the UTF-16 string starting at `offset`.
fn skip_wide_string(bytes: &[u8], mut offset: usize) -> Option<usize> {
    loop {
        let unit = read_u16(bytes, offset)?;
        offset += 2;
        if unit == 0 {
            return Some(offset);
        }
    }
}

/// Offset just past a menu/class/title field.
fn skip_sz_or_ord(bytes: &[u8], offset: usize) -> Option<usize> {
    match read_u16(bytes, offset)? {
        0x0000 => Some(offset + 2),
        0xFFFF => (offset + 4 <= bytes.len()).then_some(offset + 4),
        _ => skip_wide_string(bytes, offset),
    }
}

/// Loads the template `id` from `store` into an owned buffer.
pub fn load_template<S: TemplateStore + ?Sized>(
    store: &S,
    id: DialogId,
) -> PlatformResult<DialogTemplate> {
    match store.lookup(id) {
        Some(bytes) if !bytes.is_empty() => Ok(DialogTemplate {
            id,
            bytes: bytes.into_owned(),
        }),
        _ => {
            log::error!("DialogTemplate: Could not load dialog template {}", id.raw());
            Err(PlatformError::ResourceNotFound(format!(
                "dialog template {}",
                id.raw()
            )))
        }
    }
}

/*
 * Loads a template and applies the layout and font rewrites the current
 * configuration asks for. A font patch that cannot be applied is logged and
 * the template is used as authored.
 */
pub fn prepare_template<S: TemplateStore + ?Sized>(
    store: &S,
    id: DialogId,
    config: &DialogConfig,
    symbol_font_available: bool,
) -> PlatformResult<DialogTemplate> {
    let mut template = load_template(store, id)?;
    template.patch_for_layout(config.right_to_left)?;

    if FontPolicy::should_substitute(symbol_font_available, config) {
        if let Err(err) = template.patch_font(&config.preferred_font, &config.fallback_font) {
            log::warn!(
                "DialogTemplate: Font patch skipped for dialog {}: {err}",
                id.raw()
            );
        }
    }
    Ok(template)
}

impl DialogTemplate {
    pub fn from_bytes(id: DialogId, bytes: Vec<u8>) -> Self {
        Self { id, bytes }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copies the template into DWORD storage, the alignment the indirect
    /// dialog creation calls require.
    pub fn to_aligned_words(&self) -> Vec<u32> {
        let mut words = vec![0u32; self.bytes.len().div_ceil(4)];
        for (word, chunk) in words.iter_mut().zip(self.bytes.chunks(4)) {
            let mut raw = [0u8; 4];
            raw[..chunk.len()].copy_from_slice(chunk);
            *word = u32::from_le_bytes(raw);
        }
        words
    }

    fn malformed(&self, what: &str) -> PlatformError {
        PlatformError::MalformedTemplate(format!("dialog {}: {what}", self.id.raw()))
    }

    fn ensure_extended(&self) -> PlatformResult<()> {
        if self.bytes.len() < HEADER_LEN {
            return Err(self.malformed("header is truncated"));
        }
        if read_u16(&self.bytes, SIGNATURE_OFFSET) != Some(EXTENDED_SIGNATURE) {
            return Err(self.malformed("not an extended template"));
        }
        Ok(())
    }

    fn is_extended(&self) -> bool {
        read_u16(&self.bytes, SIGNATURE_OFFSET) == Some(EXTENDED_SIGNATURE)
    }

    /// Offset of the extended window style in either header format.
    fn ex_style_offset(&self) -> PlatformResult<usize> {
        if self.is_extended() {
            self.ensure_extended()?;
            Ok(EX_STYLE_OFFSET)
        } else if self.bytes.len() >= CLASSIC_HEADER_LEN {
            Ok(CLASSIC_EX_STYLE_OFFSET)
        } else {
            Err(self.malformed("header is truncated"))
        }
    }

    pub fn ex_style(&self) -> Option<u32> {
        read_u32(&self.bytes, self.ex_style_offset().ok()?)
    }

    /// ORs the right-to-left extended styles into the header when `rtl`.
    pub fn patch_for_layout(&mut self, rtl: bool) -> PlatformResult<()> {
        if !rtl {
            return Ok(());
        }
        let offset = self.ex_style_offset()?;
        let ex_style = read_u32(&self.bytes, offset).unwrap_or(0) | WS_EX_APPWINDOW | WS_EX_LAYOUTRTL;
        self.bytes[offset..offset + 4].copy_from_slice(&ex_style.to_le_bytes());
        Ok(())
    }

    /// Byte range of the typeface string including its NUL, if the template
    /// declares a font.
    fn typeface_range(&self) -> PlatformResult<Option<(usize, usize)>> {
        self.ensure_extended()?;
        let style = read_u32(&self.bytes, STYLE_OFFSET).unwrap_or(0);
        if style & DS_SETFONT == 0 {
            return Ok(None);
        }
        let mut offset = HEADER_LEN;
        for field in ["menu", "class", "title"] {
            offset = skip_sz_or_ord(&self.bytes, offset)
                .ok_or_else(|| self.malformed(&format!("{field} field is truncated")))?;
        }
        let start = offset + FONT_METRICS_LEN;
        let end = skip_wide_string(&self.bytes, start)
            .ok_or_else(|| self.malformed("typeface is truncated"))?;
        Ok(Some((start, end)))
    }

    pub fn typeface(&self) -> PlatformResult<Option<String>> {
        Ok(self.typeface_range()?.map(|(start, end)| {
            let units: Vec<u16> = self.bytes[start..end - 2]
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }))
    }

    /*
     * Replaces the `preferred` typeface with `fallback`. The item templates
     * following the header keep their DWORD alignment: they are moved from
     * the aligned end of the old string to the aligned end of the new one
     * and the buffer is resized to fit exactly.
     */
    pub fn patch_font(&mut self, preferred: &str, fallback: &str) -> PlatformResult<FontPatch> {
        if preferred == fallback {
            return Ok(FontPatch::Unchanged);
        }
        let Some((start, end)) = self.typeface_range()? else {
            log::warn!(
                "DialogTemplate: Could not locate font for dialog {} (no font declared)",
                self.id.raw()
            );
            return Ok(FontPatch::NotFound);
        };

        let expected: Vec<u8> = preferred
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect();
        if self.bytes[start..end] != expected[..] {
            log::warn!(
                "DialogTemplate: Could not locate font for dialog {}",
                self.id.raw()
            );
            return Ok(FontPatch::NotFound);
        }

        let replacement: Vec<u8> = fallback
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect();
        let new_end = start + replacement.len();

        let has_items = end < self.bytes.len();
        let (tail_start, tail_dest) = if has_items {
            (align_dword(end).min(self.bytes.len()), align_dword(new_end))
        } else {
            (end, new_end)
        };

        let tail = self.bytes.split_off(tail_start);
        self.bytes.truncate(start);
        self.bytes.extend_from_slice(&replacement);
        self.bytes.resize(tail_dest, 0);
        self.bytes.extend_from_slice(&tail);

        let delta = tail_start as isize - tail_dest as isize;
        log::debug!(
            "DialogTemplate: Replaced font '{preferred}' with '{fallback}' in dialog {} (shift {delta})",
            self.id.raw()
        );
        Ok(FontPatch::Replaced { delta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WS_POPUP: u32 = 0x8000_0000;

    fn push_wide(buf: &mut Vec<u8>, s: &str) {
        for unit in s.encode_utf16().chain(std::iter::once(0)) {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
    }

    fn pad_dword(buf: &mut Vec<u8>) {
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    /// Builds an extended template with `items` opaque item records.
    fn build_template(class: Option<&str>, title: &str, font: Option<&str>, items: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&0xFFFFu16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        let style = WS_POPUP | if font.is_some() { DS_SETFONT } else { 0 };
        buf.extend_from_slice(&style.to_le_bytes());
        buf.extend_from_slice(&(items.len() as u16).to_le_bytes());
        for v in [0i16, 0, 200, 100] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
        match class {
            Some(name) => push_wide(&mut buf, name),
            None => buf.extend_from_slice(&0u16.to_le_bytes()),
        }
        push_wide(&mut buf, title);
        if let Some(face) = font {
            buf.extend_from_slice(&9u16.to_le_bytes());
            buf.extend_from_slice(&400u16.to_le_bytes());
            buf.push(0);
            buf.push(1);
            push_wide(&mut buf, face);
        }
        for item in items {
            pad_dword(&mut buf);
            buf.extend_from_slice(item);
        }
        buf
    }

    const ITEM_A: &[u8] = &[0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9, 0xAA];
    const ITEM_B: &[u8] = &[0xB1, 0xB2, 0xB3, 0xB4];

    fn store_with(id: u16, bytes: Vec<u8>) -> HashMap<DialogId, Vec<u8>> {
        let mut store = HashMap::new();
        store.insert(DialogId::new(id), bytes);
        store
    }

    fn items_of(template: &DialogTemplate, typeface_end: usize) -> &[u8] {
        &template.as_bytes()[align_dword(typeface_end)..]
    }

    #[test]
    fn load_copies_bytes_and_leaves_source_untouched() {
        let raw = build_template(None, "About", Some("Segoe UI Symbol"), &[ITEM_A]);
        let store = store_with(101, raw.clone());

        let mut template = load_template(&store, DialogId::new(101)).expect("template");
        template.patch_for_layout(true).expect("rtl patch");

        assert_eq!(store[&DialogId::new(101)], raw);
        assert_ne!(template.as_bytes(), raw.as_slice());
    }

    #[test]
    fn load_missing_or_empty_resource_is_not_found() {
        let store = store_with(101, Vec::new());
        assert!(matches!(
            load_template(&store, DialogId::new(101)),
            Err(PlatformError::ResourceNotFound(_))
        ));
        assert!(matches!(
            load_template(&store, DialogId::new(999)),
            Err(PlatformError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn rtl_patch_ors_layout_bits_into_ex_style() {
        let mut raw = build_template(None, "T", Some("Segoe UI"), &[]);
        raw[EX_STYLE_OFFSET..EX_STYLE_OFFSET + 4].copy_from_slice(&0x0000_0100u32.to_le_bytes());
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw);

        template.patch_for_layout(true).expect("rtl patch");
        assert_eq!(
            template.ex_style(),
            Some(0x0000_0100 | WS_EX_APPWINDOW | WS_EX_LAYOUTRTL)
        );
    }

    #[test]
    fn ltr_layout_patch_is_a_noop() {
        let raw = build_template(None, "T", Some("Segoe UI"), &[ITEM_A]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw.clone());
        template.patch_for_layout(false).expect("ltr patch");
        assert_eq!(template.as_bytes(), raw.as_slice());
    }

    #[test]
    fn font_patch_shifts_items_by_aligned_length_difference() {
        let raw = build_template(None, "Notification", Some("Segoe UI Symbol"), &[ITEM_A, ITEM_B]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(7), raw.clone());
        let (start, old_end) = template.typeface_range().unwrap().unwrap();

        let patch = template.patch_font("Segoe UI Symbol", "Segoe UI").unwrap();

        let new_end = start + ("Segoe UI".len() + 1) * 2;
        let expected_delta = align_dword(old_end) as isize - align_dword(new_end) as isize;
        assert_eq!(patch, FontPatch::Replaced { delta: expected_delta });
        assert_eq!(template.len() as isize, raw.len() as isize - expected_delta);
        assert_eq!(template.typeface().unwrap().as_deref(), Some("Segoe UI"));

        let old_tail = &raw[align_dword(old_end)..];
        assert_eq!(items_of(&template, new_end), old_tail);
    }

    #[test]
    fn font_patch_delta_tracks_string_alignment() {
        // Titles of different parity put the typeface on both word offsets mod 4.
        for title in ["A", "AB"] {
            let raw = build_template(None, title, Some("Segoe UI Symbol"), &[ITEM_B]);
            let mut template = DialogTemplate::from_bytes(DialogId::new(3), raw.clone());
            let (start, old_end) = template.typeface_range().unwrap().unwrap();
            let string_delta = (old_end - start) as isize - (("Segoe UI".len() + 1) * 2) as isize;

            let FontPatch::Replaced { delta } = template.patch_font("Segoe UI Symbol", "Segoe UI").unwrap() else {
                panic!("font should have been replaced");
            };
            assert!((delta - string_delta).abs() <= 2, "delta {delta} vs {string_delta}");
            assert_eq!(delta % 4, 0, "items must stay DWORD aligned");
            assert_eq!(template.len() as isize, raw.len() as isize - delta);
        }
    }

    #[test]
    fn font_patch_without_items_shrinks_by_exact_string_difference() {
        let raw = build_template(None, "T", Some("Segoe UI Symbol"), &[]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw.clone());

        let patch = template.patch_font("Segoe UI Symbol", "Segoe UI").unwrap();
        let string_delta = ("Segoe UI Symbol".len() - "Segoe UI".len()) as isize * 2;
        assert_eq!(patch, FontPatch::Replaced { delta: string_delta });
        assert_eq!(template.len(), raw.len() - string_delta as usize);
    }

    #[test]
    fn longer_fallback_moves_items_right() {
        let raw = build_template(None, "T", Some("Tahoma"), &[ITEM_A]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw.clone());
        let (_, old_end) = template.typeface_range().unwrap().unwrap();

        let FontPatch::Replaced { delta } = template.patch_font("Tahoma", "Microsoft Sans Serif").unwrap() else {
            panic!("font should have been replaced");
        };
        assert!(delta < 0);
        let (_, new_end) = template.typeface_range().unwrap().unwrap();
        assert_eq!(items_of(&template, new_end), &raw[align_dword(old_end)..]);
    }

    #[test]
    fn same_font_patch_is_a_noop() {
        let raw = build_template(None, "T", Some("Segoe UI Symbol"), &[ITEM_A]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw.clone());
        assert_eq!(
            template.patch_font("Segoe UI Symbol", "Segoe UI Symbol").unwrap(),
            FontPatch::Unchanged
        );
        assert_eq!(template.as_bytes(), raw.as_slice());
    }

    #[test]
    fn unexpected_font_leaves_template_untouched() {
        let raw = build_template(None, "T", Some("MS Shell Dlg"), &[ITEM_A]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw.clone());
        assert_eq!(
            template.patch_font("Segoe UI Symbol", "Segoe UI").unwrap(),
            FontPatch::NotFound
        );
        assert_eq!(template.as_bytes(), raw.as_slice());
    }

    #[test]
    fn template_without_font_reports_not_found() {
        let raw = build_template(None, "T", None, &[ITEM_A]);
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw);
        assert_eq!(template.typeface().unwrap(), None);
        assert_eq!(
            template.patch_font("Segoe UI Symbol", "Segoe UI").unwrap(),
            FontPatch::NotFound
        );
    }

    #[test]
    fn named_class_and_ordinal_fields_are_skipped() {
        let raw = build_template(Some("ImageDlg"), "Title", Some("Segoe UI Symbol"), &[ITEM_B]);
        let template = DialogTemplate::from_bytes(DialogId::new(1), raw);
        assert_eq!(template.typeface().unwrap().as_deref(), Some("Segoe UI Symbol"));

        let mut ordinal_class = Vec::new();
        ordinal_class.extend_from_slice(&build_template(None, "", None, &[])[..HEADER_LEN]);
        ordinal_class[STYLE_OFFSET..STYLE_OFFSET + 4].copy_from_slice(&(WS_POPUP | DS_SETFONT).to_le_bytes());
        ordinal_class.extend_from_slice(&0u16.to_le_bytes());
        ordinal_class.extend_from_slice(&0xFFFFu16.to_le_bytes());
        ordinal_class.extend_from_slice(&0x0081u16.to_le_bytes());
        push_wide(&mut ordinal_class, "T");
        ordinal_class.extend_from_slice(&[9, 0, 0x90, 0x01, 0, 1]);
        push_wide(&mut ordinal_class, "Segoe UI Symbol");
        let template = DialogTemplate::from_bytes(DialogId::new(2), ordinal_class);
        assert_eq!(template.typeface().unwrap().as_deref(), Some("Segoe UI Symbol"));
    }

    fn build_classic_template(title: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&WS_POPUP.to_le_bytes());
        buf.extend_from_slice(&0x0000_0100u32.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        for v in [0i16, 0, 120, 60] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        push_wide(&mut buf, title);
        buf
    }

    #[test]
    fn rtl_patch_applies_to_classic_headers() {
        let raw = build_classic_template("About");
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), raw.clone());

        template.patch_for_layout(true).expect("rtl patch");
        assert_eq!(
            template.ex_style(),
            Some(0x0000_0100 | WS_EX_APPWINDOW | WS_EX_LAYOUTRTL)
        );
        assert_eq!(&template.as_bytes()[..CLASSIC_EX_STYLE_OFFSET], &raw[..CLASSIC_EX_STYLE_OFFSET]);
        assert_eq!(&template.as_bytes()[8..], &raw[8..]);
    }

    #[test]
    fn classic_template_prepares_in_both_directions() {
        let store = store_with(106, build_classic_template("About"));
        for right_to_left in [false, true] {
            let config = DialogConfig {
                right_to_left,
                ..Default::default()
            };
            let template = prepare_template(&store, DialogId::new(106), &config, false)
                .expect("classic template prepares");
            assert_eq!(
                template.ex_style().unwrap() & WS_EX_LAYOUTRTL != 0,
                right_to_left
            );
        }
    }

    #[test]
    fn classic_or_truncated_templates_are_malformed() {
        let mut classic = build_template(None, "T", Some("Segoe UI"), &[]);
        classic[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2].copy_from_slice(&0u16.to_le_bytes());
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), classic);
        assert!(matches!(
            template.patch_font("Segoe UI Symbol", "Segoe UI"),
            Err(PlatformError::MalformedTemplate(_))
        ));

        let mut short = DialogTemplate::from_bytes(DialogId::new(1), vec![0; CLASSIC_HEADER_LEN - 2]);
        assert!(matches!(
            short.patch_for_layout(true),
            Err(PlatformError::MalformedTemplate(_))
        ));

        let full = build_template(None, "Title", Some("Segoe UI Symbol"), &[]);
        let truncated = full[..full.len() - 6].to_vec();
        let mut template = DialogTemplate::from_bytes(DialogId::new(1), truncated.clone());
        assert!(matches!(
            template.patch_font("Segoe UI Symbol", "Segoe UI"),
            Err(PlatformError::MalformedTemplate(_))
        ));
        assert_eq!(template.as_bytes(), truncated.as_slice());
    }

    #[test]
    fn font_policy_keeps_symbol_font_only_for_its_locale() {
        let mut config = DialogConfig::default();
        assert!(FontPolicy::should_substitute(true, &config));
        config.locale = Some("th-TH".into());
        assert!(!FontPolicy::should_substitute(true, &config));
        assert!(FontPolicy::should_substitute(false, &config));
    }

    #[test]
    fn prepare_applies_layout_and_font_patches() {
        let raw = build_template(None, "Sel", Some("Segoe UI Symbol"), &[ITEM_A]);
        let store = store_with(104, raw);
        let config = DialogConfig {
            right_to_left: true,
            ..Default::default()
        };

        let template = prepare_template(&store, DialogId::new(104), &config, true).unwrap();
        assert_eq!(template.typeface().unwrap().as_deref(), Some("Segoe UI"));
        assert_eq!(
            template.ex_style().unwrap() & WS_EX_LAYOUTRTL,
            WS_EX_LAYOUTRTL
        );
    }

    #[test]
    fn aligned_words_preserve_bytes_and_pad_the_tail() {
        let template = DialogTemplate::from_bytes(DialogId::new(1), vec![1, 2, 3, 4, 5, 6]);
        let words = template.to_aligned_words();
        assert_eq!(words, vec![0x0403_0201, 0x0000_0605]);
    }
}
