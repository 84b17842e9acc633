//! Forward propagation strategies.
//!
//! [`Reference`] walks the buffers one float at a time; [`Vectorized`] runs
//! the zeroing, multiply-accumulate and bias add on [`F32x4`] lanes and only
//! applies the sigmoid per scalar. Both compute the same sums in the same
//! order per destination neuron.

use serde::{Deserialize, Serialize};

use crate::lanes::F32x4;
use crate::network::{INPUT_LAYER, Network, TRANSITION_COUNT};

#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// A forward pass over a network's own buffers.
pub trait Propagator {
    fn propagate(&self, network: &mut Network);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Reference;

#[derive(Clone, Copy, Debug, Default)]
pub struct Vectorized;

impl Propagator for Reference {
    fn propagate(&self, network: &mut Network) {
        let Network { values, weights, offsets, .. } = network;

        for layer in values.iter_mut().skip(INPUT_LAYER + 1) {
            layer.as_mut_slice().fill(0.0);
        }

        for t in 0..TRANSITION_COUNT {
            let (lower, upper) = values.split_at_mut(t + 1);
            let src = lower[t].as_slice();
            let dst = upper[0].as_mut_slice();
            let w = weights[t].as_slice();
            let b = offsets[t].as_slice();

            for &input in src {
                for (v, &weight) in dst.iter_mut().zip(w) {
                    *v += input * weight;
                }
            }
            for (v, &offset) in dst.iter_mut().zip(b) {
                *v = sigmoid(offset + *v);
            }
        }
    }
}

impl Propagator for Vectorized {
    fn propagate(&self, network: &mut Network) {
        let Network { values, weights, offsets, .. } = network;

        for layer in values.iter_mut().skip(INPUT_LAYER + 1) {
            layer.lanes_mut().fill(F32x4::ZERO);
        }

        for t in 0..TRANSITION_COUNT {
            let (lower, upper) = values.split_at_mut(t + 1);
            let src = lower[t].as_slice();
            let dst = &mut upper[0];
            let w = weights[t].lanes();
            let b = offsets[t].lanes();

            for &input in src {
                let input = F32x4::splat(input);
                for (v, &weight) in dst.lanes_mut().iter_mut().zip(w) {
                    *v = *v + input * weight;
                }
            }
            for (v, &offset) in dst.lanes_mut().iter_mut().zip(b) {
                *v = *v + offset;
            }
            for v in dst.as_mut_slice() {
                *v = sigmoid(*v);
            }
        }
    }
}

/// Runtime choice between the two strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    Reference,
    #[default]
    Vectorized,
}

impl Propagator for Propagation {
    fn propagate(&self, network: &mut Network) {
        match self {
            Propagation::Reference => Reference.propagate(network),
            Propagation::Vectorized => Vectorized.propagate(network),
        }
    }
}
