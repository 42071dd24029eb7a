//! Raw video frame representation and wire encoding
//!
//! Frames arrive from the capture collaborator in 4:2:0 planar layout and
//! exist only for the duration of one broadcast call. Planes are `Bytes`,
//! so cloning a frame is reference counted, not copied.

use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Error, Result};

/// One planar 4:2:0 video frame
///
/// Invariant, checked at construction: the Y plane holds `width * height`
/// bytes and the U/V planes `width * height / 4` bytes each.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    plane_y: Bytes,
    plane_u: Bytes,
    plane_v: Bytes,
}

impl VideoFrame {
    /// Build a frame, validating plane sizes for the declared dimensions
    pub fn new(
        width: u32,
        height: u32,
        plane_y: Bytes,
        plane_u: Bytes,
        plane_v: Bytes,
    ) -> Result<Self> {
        let luma = width as usize * height as usize;
        let chroma = luma / 4;

        if plane_y.len() != luma {
            return Err(Error::PlaneSize {
                plane: "Y",
                expected: luma,
                actual: plane_y.len(),
            });
        }
        if plane_u.len() != chroma {
            return Err(Error::PlaneSize {
                plane: "U",
                expected: chroma,
                actual: plane_u.len(),
            });
        }
        if plane_v.len() != chroma {
            return Err(Error::PlaneSize {
                plane: "V",
                expected: chroma,
                actual: plane_v.len(),
            });
        }

        Ok(Self {
            width,
            height,
            plane_y,
            plane_u,
            plane_v,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encode the frame as its five binary transport frames
    ///
    /// Fixed order: width (4-byte little-endian), height (4-byte
    /// little-endian), Y plane, U plane, V plane. There is no frame index,
    /// timestamp, or checksum; consumers rely on the transport's frame
    /// boundaries.
    pub fn wire_messages(&self) -> [Message; 5] {
        [
            Message::binary(self.width.to_le_bytes().to_vec()),
            Message::binary(self.height.to_le_bytes().to_vec()),
            Message::binary(self.plane_y.to_vec()),
            Message::binary(self.plane_u.to_vec()),
            Message::binary(self.plane_v.to_vec()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_640x480() -> VideoFrame {
        VideoFrame::new(
            640,
            480,
            Bytes::from(vec![0u8; 640 * 480]),
            Bytes::from(vec![1u8; 640 * 480 / 4]),
            Bytes::from(vec![2u8; 640 * 480 / 4]),
        )
        .unwrap()
    }

    #[test]
    fn test_plane_sizing() {
        let frame = frame_640x480();
        let [_, _, y, u, v] = frame.wire_messages();

        assert_eq!(y.into_data().len(), 307_200);
        assert_eq!(u.into_data().len(), 76_800);
        assert_eq!(v.into_data().len(), 76_800);
    }

    #[test]
    fn test_dimension_frames_are_little_endian() {
        let frame = frame_640x480();
        let [width, height, ..] = frame.wire_messages();

        assert_eq!(width.into_data(), 640u32.to_le_bytes().to_vec());
        assert_eq!(height.into_data(), 480u32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_short_plane_rejected() {
        let result = VideoFrame::new(
            640,
            480,
            Bytes::from(vec![0u8; 100]),
            Bytes::from(vec![0u8; 640 * 480 / 4]),
            Bytes::from(vec![0u8; 640 * 480 / 4]),
        );
        assert!(matches!(
            result,
            Err(Error::PlaneSize {
                plane: "Y",
                expected: 307_200,
                actual: 100,
            })
        ));
    }

    #[test]
    fn test_chroma_plane_rejected() {
        let result = VideoFrame::new(
            4,
            4,
            Bytes::from(vec![0u8; 16]),
            Bytes::from(vec![0u8; 4]),
            Bytes::from(vec![0u8; 5]),
        );
        assert!(matches!(result, Err(Error::PlaneSize { plane: "V", .. })));
    }
}
