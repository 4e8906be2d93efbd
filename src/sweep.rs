//! Normalized-overlap tables around a fiducial parameter point

use crate::config::OverlapSweepConfig;
use crate::error::FisherError;
use crate::noise::NoiseCurveTrait;
use crate::param::{Param, ParameterPoint};
use crate::series::FrequencySeries;
use crate::waveform::{InnerProductTrait, Overlap, WaveformService, build_overlap};

use itertools::iproduct;
use macro_const::macro_const;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use num_complex::Complex64;
use unzip3::Unzip3;

macro_const! {
    const SWEEP_DOC: &str = r#"
The fiducial waveform $h_0$ is compared with waveforms whose scanned parameters take values in
the symmetric window $\lambda \pm \delta\lambda$ around the fiducial ones, $\delta\lambda$ being
the finite-difference step of the parameter. Every sample gets the normalized overlap
$$
z = \frac{\langle h_0 | h \rangle}{\|h_0\| \|h\|},
$$
and only samples with $z$ strictly above [OverlapSweepConfig::cut] are kept. Coordinates are
reported divided by the unit scale of the parameter, e.g. in solar masses for masses.
"#;
}

/// Normalized overlaps tabulated against one or more parameters
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapTable {
    pub params: Vec<Param>,
    /// Fiducial values of the parameters, in the units of `coords`
    pub center: Vec<f64>,
    /// One row per kept sample, one column per parameter
    pub coords: Array2<f64>,
    pub overlap: Array1<f64>,
}

impl OverlapTable {
    pub fn len(&self) -> usize {
        self.overlap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlap.is_empty()
    }

    pub fn ndim(&self) -> usize {
        self.params.len()
    }

    /// Coordinates of the given parameter column
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.coords.column(index)
    }

    /// Coordinates with the fiducial centre subtracted
    pub fn relative_coords(&self) -> Array2<f64> {
        let mut coords = self.coords.clone();
        for (mut column, &center) in coords.columns_mut().into_iter().zip(self.center.iter()) {
            column -= center;
        }
        coords
    }
}

/// Fiducial waveform with the inner product built on its grid
struct Reference<'a, P, W> {
    service: &'a W,
    point: &'a P,
    h0: FrequencySeries<Complex64>,
    overlap: Overlap,
    norm0: f64,
    cut: f64,
}

impl<'a, P, W> Reference<'a, P, W>
where
    P: ParameterPoint,
    W: WaveformService<P>,
{
    fn new<N: NoiseCurveTrait>(
        service: &'a W,
        point: &'a P,
        noise: &N,
        config: &OverlapSweepConfig,
    ) -> Result<Self, FisherError> {
        let h0 = service.complex_hoff(point)?;
        let fmax = config.fmax.unwrap_or(f64::INFINITY);
        let overlap = build_overlap(&h0, noise, point.fmin(), fmax, config.max_t);
        let norm0 = overlap.norm(&h0)?;
        Ok(Self {
            service,
            point,
            h0,
            overlap,
            norm0,
            cut: config.cut,
        })
    }

    /// Normalized overlap at the point with the given parameters replaced
    fn sample(&self, values: &[(Param, f64)]) -> Result<f64, FisherError> {
        let mut here = self.point.clone();
        for &(param, value) in values {
            here.assign(param, value)?;
        }
        let h = self.service.complex_hoff(&here)?;
        Ok(self.overlap.ip(&self.h0, &h)? / self.norm0 / self.overlap.norm(&h)?)
    }

    /// Sampling window of a parameter
    fn window(&self, param: Param, n: usize) -> Result<Array1<f64>, FisherError> {
        let value = self.point.extract(param);
        let step = param.step(value)?;
        Ok(Array1::linspace(value - step, value + step, n))
    }
}

/// Normalized overlap versus one parameter
///
#[doc = SWEEP_DOC!()]
///
/// The window is sampled by [OverlapSweepConfig::n_points_1d] points.
pub fn overlap_versus_parameter<P, W, N>(
    service: &W,
    point: &P,
    param: Param,
    noise: &N,
    config: &OverlapSweepConfig,
) -> Result<OverlapTable, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    let reference = Reference::new(service, point, noise, config)?;
    let scale = param.unit_scale();
    let mut x = vec![];
    let mut z = vec![];
    let window = reference.window(param, config.n_points_1d)?;
    for &value in window.iter() {
        let overlap = reference.sample(&[(param, value)])?;
        if overlap > reference.cut {
            x.push(value / scale);
            z.push(overlap);
        }
    }
    tracing::debug!(%param, kept = z.len(), "one-parameter overlap sweep");
    Ok(OverlapTable {
        params: vec![param],
        center: vec![point.extract(param) / scale],
        coords: Array1::from(x).insert_axis(Axis(1)),
        overlap: z.into(),
    })
}

/// Normalized overlap versus two parameters
///
#[doc = SWEEP_DOC!()]
///
/// The window is sampled by a square grid of [OverlapSweepConfig::n_points_2d] points per axis,
/// the first parameter varies slowest.
pub fn overlap_grid_versus_parameters<P, W, N>(
    service: &W,
    point: &P,
    p1: Param,
    p2: Param,
    noise: &N,
    config: &OverlapSweepConfig,
) -> Result<OverlapTable, FisherError>
where
    P: ParameterPoint,
    W: WaveformService<P>,
    N: NoiseCurveTrait,
{
    let reference = Reference::new(service, point, noise, config)?;
    let (scale1, scale2) = (p1.unit_scale(), p2.unit_scale());
    let xs = reference.window(p1, config.n_points_2d)?;
    let ys = reference.window(p2, config.n_points_2d)?;
    let samples = iproduct!(xs.iter().copied(), ys.iter().copied())
        .map(|(x, y)| Ok((x, y, reference.sample(&[(p1, x), (p2, y)])?)))
        .collect::<Result<Vec<_>, FisherError>>()?;
    let (x, y, z): (Vec<_>, Vec<_>, Vec<_>) = samples
        .into_iter()
        .filter(|&(_, _, z)| z > reference.cut)
        .map(|(x, y, z)| (x / scale1, y / scale2, z))
        .unzip3();
    tracing::debug!(%p1, %p2, kept = z.len(), "two-parameter overlap sweep");
    Ok(OverlapTable {
        params: vec![p1, p2],
        center: vec![point.extract(p1) / scale1, point.extract(p2) / scale2],
        coords: Array2::from_shape_fn((x.len(), 2), |(i, j)| if j == 0 { x[i] } else { y[i] }),
        overlap: z.into(),
    })
}
