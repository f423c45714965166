//! Length-prefixed big-endian helpers for the canonical encodings.

pub(crate) fn put_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Cursor over an encoded buffer. Every read names the field it was after so
/// that decode errors point at the truncated or oversized part.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| format!("truncated input: missing {field}"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], String> {
        let slice = self.take(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, field: &str) -> Result<u8, String> {
        Ok(self.array::<1>(field)?[0])
    }

    pub(crate) fn u32(&mut self, field: &str) -> Result<u32, String> {
        Ok(u32::from_be_bytes(self.array(field)?))
    }

    pub(crate) fn u64(&mut self, field: &str) -> Result<u64, String> {
        Ok(u64::from_be_bytes(self.array(field)?))
    }

    pub(crate) fn len_prefixed(&mut self, max: usize, field: &str) -> Result<&'a [u8], String> {
        let len = self.u32(field)? as usize;
        if len == 0 || len > max {
            return Err(format!("invalid {field} length: {len}"));
        }
        self.take(len, field)
    }

    pub(crate) fn finish(self) -> Result<(), String> {
        if self.pos != self.bytes.len() {
            return Err(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let mut buf = vec![7u8];
        buf.extend_from_slice(&42u64.to_be_bytes());
        put_len_prefixed(&mut buf, b"abc");

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.u8("tag").unwrap(), 7);
        assert_eq!(reader.u64("amount").unwrap(), 42);
        assert_eq!(reader.len_prefixed(16, "blob").unwrap(), b"abc");
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn reports_truncation_and_trailing_bytes() {
        let mut reader = Reader::new(&[0, 0]);
        let err = reader.u32("count").unwrap_err();
        assert!(err.contains("count"));

        let mut reader = Reader::new(&[1, 2]);
        reader.u8("tag").unwrap();
        assert!(reader.finish().is_err());
    }

    #[test]
    fn rejects_oversized_prefix() {
        let mut buf = Vec::new();
        put_len_prefixed(&mut buf, &[0u8; 8]);
        assert!(Reader::new(&buf).len_prefixed(4, "blob").is_err());
    }
}
