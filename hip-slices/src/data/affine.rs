//! 由 nifti header 推导体素到世界坐标的仿射矩阵.

use crate::Affine;
use nifti::NiftiHeader;

/// 求 `header` 对应的 4×4 仿射矩阵.
///
/// 优先级与常见神经影像工具一致:
///
/// 1. `sform_code > 0` 时直接使用 `srow_{x, y, z}`;
/// 2. 否则 `qform_code > 0` 时由四元数、分辨率和偏移构造;
/// 3. 否则使用基础仿射: 对角线为 `(-di, dj, dk)`, 平移使体数据中心落在原点.
pub fn affine_from_header(header: &NiftiHeader) -> Affine {
    if header.sform_code > 0 {
        sform(header)
    } else if header.qform_code > 0 {
        qform(header)
    } else {
        base(header)
    }
}

#[inline]
fn sform(h: &NiftiHeader) -> Affine {
    let row = |r: [f32; 4]| r.map(f64::from);
    [
        row(h.srow_x),
        row(h.srow_y),
        row(h.srow_z),
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[allow(clippy::many_single_char_names)]
fn qform(h: &NiftiHeader) -> Affine {
    let (b, c, d) = (
        h.quatern_b as f64,
        h.quatern_c as f64,
        h.quatern_d as f64,
    );
    let a = (1.0 - b * b - c * c - d * d).max(0.0).sqrt();

    // pixdim[0] 为 qfac, 只能是 1 或 -1. 0 视作 1.
    let qfac = if h.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    let [i, j, k] = [
        h.pixdim[1] as f64,
        h.pixdim[2] as f64,
        h.pixdim[3] as f64 * qfac,
    ];

    [
        [
            (a * a + b * b - c * c - d * d) * i,
            2.0 * (b * c - a * d) * j,
            2.0 * (b * d + a * c) * k,
            h.quatern_x as f64,
        ],
        [
            2.0 * (b * c + a * d) * i,
            (a * a + c * c - b * b - d * d) * j,
            2.0 * (c * d - a * b) * k,
            h.quatern_y as f64,
        ],
        [
            2.0 * (b * d - a * c) * i,
            2.0 * (c * d + a * b) * j,
            (a * a + d * d - c * c - b * b) * k,
            h.quatern_z as f64,
        ],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

fn base(h: &NiftiHeader) -> Affine {
    let ndim = (h.dim[0] as usize).min(3);
    let mut shape = [1.0f64; 3];
    let mut zooms = [1.0f64; 3];
    for axis in 0..ndim {
        shape[axis] = h.dim[axis + 1] as f64;
        zooms[axis] = h.pixdim[axis + 1] as f64;
    }
    let origin = shape.map(|n| (n - 1.0) / 2.0);

    [
        [-zooms[0], 0.0, 0.0, origin[0] * zooms[0]],
        [0.0, zooms[1], 0.0, -origin[1] * zooms[1]],
        [0.0, 0.0, zooms[2], -origin[2] * zooms[2]],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::affine_from_header;
    use nifti::NiftiHeader;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_sform_first() {
        let mut h = NiftiHeader::default();
        h.sform_code = 1;
        h.qform_code = 1;
        h.srow_x = [1.0, 0.0, 0.0, 10.0];
        h.srow_y = [0.0, 2.0, 0.0, -20.0];
        h.srow_z = [0.0, 0.0, 3.0, 30.0];

        let a = affine_from_header(&h);
        assert_eq!(a[0], [1.0, 0.0, 0.0, 10.0]);
        assert_eq!(a[1], [0.0, 2.0, 0.0, -20.0]);
        assert_eq!(a[2], [0.0, 0.0, 3.0, 30.0]);
        assert_eq!(a[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_qform_identity_rotation() {
        let mut h = NiftiHeader::default();
        h.sform_code = 0;
        h.qform_code = 1;
        h.quatern_b = 0.0;
        h.quatern_c = 0.0;
        h.quatern_d = 0.0;
        h.quatern_x = 5.0;
        h.quatern_y = 6.0;
        h.quatern_z = 7.0;
        h.pixdim = [1.0, 0.5, 0.75, 2.0, 0.0, 0.0, 0.0, 0.0];

        let a = affine_from_header(&h);
        assert!(float_eq(a[0][0], 0.5));
        assert!(float_eq(a[1][1], 0.75));
        assert!(float_eq(a[2][2], 2.0));
        assert!(float_eq(a[0][1], 0.0));
        assert_eq!([a[0][3], a[1][3], a[2][3]], [5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_qform_negative_qfac_flips_k() {
        let mut h = NiftiHeader::default();
        h.sform_code = 0;
        h.qform_code = 1;
        h.quatern_b = 0.0;
        h.quatern_c = 0.0;
        h.quatern_d = 0.0;
        h.pixdim = [-1.0, 1.0, 1.0, 3.0, 0.0, 0.0, 0.0, 0.0];

        assert!(float_eq(affine_from_header(&h)[2][2], -3.0));
    }

    #[test]
    fn test_base_affine_centers_volume() {
        let mut h = NiftiHeader::default();
        h.sform_code = 0;
        h.qform_code = 0;
        h.dim = [2, 256, 144, 1, 1, 1, 1, 1];
        h.pixdim = [1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];

        let a = affine_from_header(&h);
        assert!(float_eq(a[0][0], -2.0));
        assert!(float_eq(a[0][3], 255.0));
        assert!(float_eq(a[1][1], 1.0));
        assert!(float_eq(a[1][3], -71.5));
        assert!(float_eq(a[2][3], 0.0));
    }
}
