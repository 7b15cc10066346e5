use crate::EncodeError;

const PAD: u8 = b'=';
const INVALID: u8 = 0xff;

const BASE64_STD: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const BASE64_INDEX: [u8; 256] = {
    let mut index = [INVALID; 256];
    let mut i = 0;
    while i < BASE64_STD.len() {
        index[BASE64_STD[i] as usize] = i as u8;
        i += 1;
    }
    index
};

/// RFC 4648标准码表base64, 输出总是带`=`填充
#[derive(Clone, Copy, Default, Debug)]
pub struct Base64;

impl Base64 {
    pub fn std() -> Self {
        Self
    }

    pub fn encode_to_string(&self, data: &[u8]) -> String {
        let mut out = String::with_capacity((data.len() + 2) / 3 * 4);
        for chunk in data.chunks(3) {
            for c in Self::encode_group(chunk) {
                out.push(char::from(c));
            }
        }
        out
    }

    /// 解码时忽略ASCII空白字符
    pub fn decode_str(&self, s: &str) -> Result<Vec<u8>, EncodeError> {
        let (mut group, mut glen, mut pads) = ([0u8; 4], 0usize, 0usize);
        let (mut out, mut chars) = (Vec::with_capacity(s.len() / 4 * 3), 0usize);

        for (pos, &c) in s.as_bytes().iter().enumerate() {
            if c.is_ascii_whitespace() {
                continue;
            }
            chars += 1;

            if c == PAD {
                // 填充只能出现在一组的第3或第4个位置
                if glen < 2 {
                    return Err(EncodeError::InvalidPaddingInDec(pos));
                }
                pads += 1;
                glen += 1;
            } else {
                if pads > 0 {
                    return Err(EncodeError::InvalidPaddingInDec(pos));
                }
                let idx = BASE64_INDEX[c as usize];
                if idx == INVALID {
                    return Err(EncodeError::InvalidBaseCodeInDec(char::from(c)));
                }
                group[glen] = idx;
                glen += 1;
            }

            if glen == 4 {
                let x = [
                    (group[0] << 2) | (group[1] >> 4),
                    (group[1] << 4) | (group[2] >> 2),
                    (group[2] << 6) | group[3],
                ];
                out.extend_from_slice(&x[..3 - pads]);
                group = [0u8; 4];
                glen = 0;
            }
        }

        if glen != 0 {
            return Err(EncodeError::InvalidLenInDec(chars));
        }

        Ok(out)
    }

    // 1~3字节 -> 4个字符
    fn encode_group(d: &[u8]) -> [u8; 4] {
        let (b0, b1, b2) = (
            d[0],
            d.get(1).copied().unwrap_or(0),
            d.get(2).copied().unwrap_or(0),
        );

        let mut x = [
            BASE64_STD[(b0 >> 2) as usize],
            BASE64_STD[(((b0 & 0x3) << 4) | (b1 >> 4)) as usize],
            BASE64_STD[(((b1 & 0xf) << 2) | (b2 >> 6)) as usize],
            BASE64_STD[(b2 & 0x3f) as usize],
        ];
        x.iter_mut().skip(d.len() + 1).for_each(|a| *a = PAD);
        x
    }
}
