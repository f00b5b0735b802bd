//! A sequential big-endian cursor over bytes that are already in memory.

use crate::error::{Error, Result};

/// Reads the integers of the class file format one after another.
///
/// A read that would run past the end of the data fails with [`Error::UnexpectedEof`] and leaves the position where it was.
#[derive(Debug, Clone)]
pub struct ClassReader<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> ClassReader<'a> {
	pub fn new(data: &'a [u8]) -> ClassReader<'a> {
		ClassReader { data, pos: 0 }
	}

	/// Creates a reader that starts reading at `pos`.
	pub fn at(data: &'a [u8], pos: usize) -> ClassReader<'a> {
		ClassReader { data, pos }
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn remaining(&self) -> usize {
		self.data.len().saturating_sub(self.pos)
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	fn read_slice(&mut self, size: usize) -> Result<&'a [u8]> {
		let slice = self.data.get(self.pos..)
			.and_then(|rest| rest.get(..size))
			.ok_or(Error::UnexpectedEof {
				offset: self.pos,
				requested: size,
				remaining: self.remaining(),
			})?;
		self.pos += size;
		Ok(slice)
	}

	fn read_n<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut buf = [0u8; N];
		buf.copy_from_slice(self.read_slice(N)?);
		Ok(buf)
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(u8::from_be_bytes(self.read_n()?))
	}
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.read_n()?))
	}
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.read_n()?))
	}
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(i8::from_be_bytes(self.read_n()?))
	}
	pub fn read_i16(&mut self) -> Result<i16> {
		Ok(i16::from_be_bytes(self.read_n()?))
	}
	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(i32::from_be_bytes(self.read_n()?))
	}

	pub fn read_u16_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u16()? as usize)
	}
	pub fn read_u32_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u32()? as usize)
	}

	pub fn read_u8_vec(&mut self, size: usize) -> Result<Vec<u8>> {
		Ok(self.read_slice(size)?.to_vec())
	}

	pub fn read_vec<T, S, E>(&mut self, get_size: S, mut get_element: E) -> Result<Vec<T>>
		where
			S: FnOnce(&mut Self) -> Result<usize>,
			E: FnMut(&mut Self) -> Result<T>
	{
		let size = get_size(self)?;
		// don't trust the size for the allocation, a corrupt count shouldn't reserve gigabytes
		let mut vec = Vec::with_capacity(size.min(self.remaining()));
		for _ in 0..size {
			vec.push(get_element(self)?);
		}
		Ok(vec)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::error::Error;
	use crate::reader::ClassReader;

	#[test]
	fn big_endian() -> anyhow::Result<()> {
		let data = [0xca, 0xfe, 0xba, 0xbe, 0x00, 0x34, 0x7f];
		let mut reader = ClassReader::new(&data);
		assert_eq!(reader.read_u32()?, 0xCAFEBABE);
		assert_eq!(reader.read_u16()?, 52);
		assert_eq!(reader.read_u8()?, 0x7f);
		assert!(reader.is_empty());
		Ok(())
	}

	#[test]
	fn signed() -> anyhow::Result<()> {
		let data = [0xff, 0xff, 0xf4, 0x80, 0xff, 0xff, 0xff, 0xfe];
		let mut reader = ClassReader::new(&data);
		assert_eq!(reader.read_i16()?, -1);
		assert_eq!(reader.read_i8()?, -12);
		assert_eq!(reader.read_i8()?, -128);
		assert_eq!(reader.read_i32()?, -2);
		Ok(())
	}

	#[test]
	fn short_read_keeps_position() -> anyhow::Result<()> {
		let data = [0x01, 0x02, 0x03];
		let mut reader = ClassReader::new(&data);
		assert_eq!(reader.read_u16()?, 0x0102);

		let error = reader.read_u32().unwrap_err();
		assert!(matches!(error, Error::UnexpectedEof { offset: 2, requested: 4, remaining: 1 }), "{error:?}");
		assert_eq!(reader.position(), 2);

		assert_eq!(reader.read_u8()?, 0x03);
		Ok(())
	}

	#[test]
	fn vec_of_elements() -> anyhow::Result<()> {
		let data = [0x00, 0x02, 0x00, 0x07, 0x00, 0x09];
		let mut reader = ClassReader::new(&data);
		let vec = reader.read_vec(|r| r.read_u16_as_usize(), |r| r.read_u16())?;
		assert_eq!(vec, vec![7, 9]);
		Ok(())
	}

	#[test]
	fn reader_at_offset() -> anyhow::Result<()> {
		let data = [0xa7, 0xff, 0xf6];
		let mut reader = ClassReader::at(&data, 1);
		assert_eq!(reader.read_i16()?, -10);
		assert_eq!(reader.position(), 3);
		Ok(())
	}
}
