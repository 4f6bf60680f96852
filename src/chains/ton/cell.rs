//! Single-cell builder and bag-of-cells serialization for message bodies.

use crate::errors::AdminError;

const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];
const MAX_CELL_BITS: usize = 1023;

/// Op code of an internal message: CRC32 of its name
pub fn op_code(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}

#[derive(Debug, Default, Clone)]
pub struct CellBuilder {
    data: Vec<u8>,
    bits: usize,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_bit(&mut self, bit: bool) -> Result<(), AdminError> {
        if self.bits == MAX_CELL_BITS {
            return Err(AdminError::Internal("cell overflow".to_string()));
        }
        if self.bits % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            let last = self.data.len() - 1;
            self.data[last] |= 0x80 >> (self.bits % 8);
        }
        self.bits += 1;
        Ok(())
    }

    /// Big-endian unsigned integer in `width` bits
    pub fn store_uint(mut self, value: u128, width: usize) -> Result<Self, AdminError> {
        if width < 128 && value >> width != 0 {
            return Err(AdminError::Internal(format!(
                "{value} does not fit in {width} bits"
            )));
        }
        for i in (0..width).rev() {
            let bit = i < 128 && (value >> i) & 1 == 1;
            self.store_bit(bit)?;
        }
        Ok(self)
    }

    /// `Coins`: 4-bit byte length followed by the big-endian amount
    pub fn store_coins(self, amount: u128) -> Result<Self, AdminError> {
        let len = (128 - amount.leading_zeros() as usize).div_ceil(8);
        if len > 15 {
            return Err(AdminError::InvalidAmount(format!("{amount} exceeds the coins range")));
        }
        self.store_uint(len as u128, 4)?.store_uint(amount, len * 8)
    }

    pub fn bit_len(&self) -> usize {
        self.bits
    }

    /// Data bytes with the completion tag when not byte-aligned
    fn padded_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.bits % 8 != 0 {
            let last = data.len() - 1;
            data[last] |= 0x80 >> (self.bits % 8);
        }
        data
    }

    /// Serialize as a bag of cells holding this single root cell
    pub fn to_boc(&self) -> Vec<u8> {
        let d1 = 0u8; // no refs, ordinary, level 0
        let d2 = (self.bits / 8 + self.bits.div_ceil(8)) as u8;
        let mut cell = vec![d1, d2];
        cell.extend(self.padded_data());

        let mut boc = BOC_MAGIC.to_vec();
        boc.push(0x01); // no index, no crc, 1-byte cell references
        boc.push(0x01); // 1-byte offsets
        boc.push(1); // cells
        boc.push(1); // roots
        boc.push(0); // absent
        boc.push(cell.len() as u8);
        boc.push(0); // root index
        boc.extend(cell);
        boc
    }
}
