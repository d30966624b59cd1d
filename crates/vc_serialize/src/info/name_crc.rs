/// Hashes an element or class name.
///
/// The hash ignores ASCII case, so `"Alpha"` and `"alpha"` name the same field.
///
/// # Examples
///
/// ```
/// use vc_serialize::info::name_crc;
///
/// assert_eq!(name_crc("Value1"), name_crc("value1"));
/// assert_ne!(name_crc("value1"), name_crc("value2"));
/// ```
pub fn name_crc(name: &str) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0_u8; 64];
    for chunk in name.as_bytes().chunks(buf.len()) {
        let lower = &mut buf[..chunk.len()];
        lower.copy_from_slice(chunk);
        lower.make_ascii_lowercase();
        hasher.update(lower);
    }
    hasher.finalize()
}
