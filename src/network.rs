use crate::error::NetworkError;
use crate::lanes::{LANES, LaneBuffer};
use crate::propagate::{Propagator, Reference, Vectorized};
use crate::random::RandomSource;

pub const INPUT_LAYER_SIZE: usize = 4;
pub const HIDDEN_LAYER_SIZE: usize = 8;
pub const OUTPUT_LAYER_SIZE: usize = 4;
pub const HIDDEN_LAYER_COUNT: usize = 2;

pub const LAYER_COUNT: usize = HIDDEN_LAYER_COUNT + 2;
pub const TRANSITION_COUNT: usize = LAYER_COUNT - 1;
pub const INPUT_LAYER: usize = 0;
pub const OUTPUT_LAYER: usize = LAYER_COUNT - 1;

/// Neuron count of every layer, input first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerSizes(pub [usize; LAYER_COUNT]);

impl Default for LayerSizes {
    fn default() -> Self {
        let mut sizes = [HIDDEN_LAYER_SIZE; LAYER_COUNT];
        sizes[INPUT_LAYER] = INPUT_LAYER_SIZE;
        sizes[OUTPUT_LAYER] = OUTPUT_LAYER_SIZE;
        Self(sizes)
    }
}

impl LayerSizes {
    /// Every layer must hold a positive whole number of lanes.
    pub fn validate(&self) -> Result<(), NetworkError> {
        match self.0.iter().position(|&size| size == 0 || size % LANES != 0) {
            Some(layer) => Err(NetworkError::InvalidLayerSize { layer, size: self.0[layer] }),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn layer(&self, layer: usize) -> usize {
        self.0[layer]
    }

    #[inline]
    pub fn inputs(&self) -> usize {
        self.0[INPUT_LAYER]
    }
}

/// Which buffer a mutation overwrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parameter {
    Weight,
    Offset,
}

/// Record of the single scalar changed by [`Network::mutate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mutation {
    pub transition: usize,
    pub index: usize,
    pub parameter: Parameter,
    pub previous: f32,
    pub value: f32,
}

/// Fixed-topology feed-forward network.
///
/// Transition `l` (layer `l` to `l + 1`) carries one weight and one offset per
/// destination neuron. Every source neuron reaches destination `j` through the
/// same `weights[l][j]`; this is not a dense layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    pub(crate) sizes: LayerSizes,
    pub(crate) values: Vec<LaneBuffer>,
    pub(crate) weights: Vec<LaneBuffer>,
    pub(crate) offsets: Vec<LaneBuffer>,
}

impl Network {
    /// Network with the default `[4, 8, 8, 4]` layout.
    pub fn new(rng: &mut RandomSource) -> Result<Self, NetworkError> {
        Self::with_sizes(LayerSizes::default(), rng)
    }

    /// Allocates every buffer, zeroes all activations and draws every weight
    /// and offset from `rng`, transition by transition (weights first).
    pub fn with_sizes(sizes: LayerSizes, rng: &mut RandomSource) -> Result<Self, NetworkError> {
        sizes.validate()?;

        let values = sizes
            .0
            .iter()
            .map(|&size| LaneBuffer::zeroed(size))
            .collect::<Result<Vec<_>, _>>()?;

        let mut weights = Vec::with_capacity(TRANSITION_COUNT);
        let mut offsets = Vec::with_capacity(TRANSITION_COUNT);
        for &size in &sizes.0[1..] {
            let mut w = LaneBuffer::zeroed(size)?;
            w.as_mut_slice().iter_mut().for_each(|v| *v = rng.value());
            let mut o = LaneBuffer::zeroed(size)?;
            o.as_mut_slice().iter_mut().for_each(|v| *v = rng.value());
            weights.push(w);
            offsets.push(o);
        }

        Ok(Self { sizes, values, weights, offsets })
    }

    /// Deep copy of every buffer, activations included.
    pub fn try_clone(&self) -> Result<Self, NetworkError> {
        let copy = |bufs: &[LaneBuffer]| {
            bufs.iter().map(LaneBuffer::try_clone).collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            sizes: self.sizes,
            values: copy(&self.values)?,
            weights: copy(&self.weights)?,
            offsets: copy(&self.offsets)?,
        })
    }

    #[inline]
    pub fn sizes(&self) -> LayerSizes {
        self.sizes
    }

    /// Number of weights plus offsets.
    pub fn parameter_count(&self) -> usize {
        2 * self.sizes.0[1..].iter().sum::<usize>()
    }

    /// # Panics
    ///
    /// Panics if `index` is not below the input layer size.
    pub fn set_input(&mut self, index: usize, value: f32) {
        let inputs = self.values[INPUT_LAYER].as_mut_slice();
        assert!(index < inputs.len(), "input index {index} out of range for {} inputs", inputs.len());
        inputs[index] = value;
    }

    /// Copies a whole input vector.
    ///
    /// # Panics
    ///
    /// Panics if `values` is not exactly the input layer size.
    pub fn set_inputs(&mut self, values: &[f32]) {
        let inputs = self.values[INPUT_LAYER].as_mut_slice();
        assert_eq!(values.len(), inputs.len(), "input vector has the wrong length");
        inputs.copy_from_slice(values);
    }

    /// Output activation from the last `process` call, zero before any.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the output layer size.
    pub fn get_output(&self, index: usize) -> f32 {
        let outputs = self.outputs();
        assert!(index < outputs.len(), "output index {index} out of range for {} outputs", outputs.len());
        outputs[index]
    }

    #[inline]
    pub fn outputs(&self) -> &[f32] {
        self.values[OUTPUT_LAYER].as_slice()
    }

    #[inline]
    pub fn values(&self, layer: usize) -> &[f32] {
        self.values[layer].as_slice()
    }

    #[inline]
    pub fn weights(&self, transition: usize) -> &[f32] {
        self.weights[transition].as_slice()
    }

    #[inline]
    pub fn weights_mut(&mut self, transition: usize) -> &mut [f32] {
        self.weights[transition].as_mut_slice()
    }

    #[inline]
    pub fn offsets(&self, transition: usize) -> &[f32] {
        self.offsets[transition].as_slice()
    }

    #[inline]
    pub fn offsets_mut(&mut self, transition: usize) -> &mut [f32] {
        self.offsets[transition].as_mut_slice()
    }

    /// Scalar forward pass.
    pub fn process(&mut self) {
        self.process_with(&Reference);
    }

    /// Lane-vectorized forward pass, equivalent to [`process`](Self::process)
    /// up to float reassociation.
    pub fn process_fast(&mut self) {
        self.process_with(&Vectorized);
    }

    pub fn process_with<P: Propagator + ?Sized>(&mut self, propagator: &P) {
        propagator.propagate(self);
    }

    /// Overwrites exactly one weight or offset with a fresh random value.
    ///
    /// The transition and the destination index are uniform; a coin flip on
    /// the sign of one draw picks weight (positive) or offset.
    pub fn mutate(&mut self, rng: &mut RandomSource) -> Mutation {
        let transition = rng.range(0, TRANSITION_COUNT - 1);
        let index = rng.range(0, self.sizes.layer(transition + 1) - 1);
        let parameter = if rng.value() > 0.0 { Parameter::Weight } else { Parameter::Offset };
        let value = rng.value();

        let slot = match parameter {
            Parameter::Weight => &mut self.weights[transition].as_mut_slice()[index],
            Parameter::Offset => &mut self.offsets[transition].as_mut_slice()[index],
        };
        let previous = std::mem::replace(slot, value);

        log::trace!("mutated {parameter:?} t={transition} j={index}: {previous:.4} -> {value:.4}");
        Mutation { transition, index, parameter, previous, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(seed: u64) -> Network {
        Network::new(&mut RandomSource::new(seed)).unwrap()
    }

    /// Every weight and offset, flattened in transition order.
    fn parameters(net: &Network) -> Vec<f32> {
        (0..TRANSITION_COUNT)
            .flat_map(|t| net.weights(t).iter().chain(net.offsets(t)).copied().collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn default_layout() {
        let net = network(1);
        assert_eq!(net.sizes(), LayerSizes([4, 8, 8, 4]));
        for t in 0..TRANSITION_COUNT {
            assert_eq!(net.weights(t).len(), net.sizes().layer(t + 1));
            assert_eq!(net.offsets(t).len(), net.sizes().layer(t + 1));
        }
        assert_eq!(net.parameter_count(), 2 * (8 + 8 + 4));
    }

    #[test]
    fn buffers_are_aligned() {
        let net = network(2);
        let all = net.values.iter().chain(&net.weights).chain(&net.offsets);
        for buf in all {
            assert_eq!(buf.as_slice().as_ptr() as usize % 16, 0);
        }
    }

    #[test]
    fn construction_zeroes_activations_and_randomizes_parameters() {
        let net = network(3);
        for layer in 0..LAYER_COUNT {
            assert!(net.values(layer).iter().all(|&v| v == 0.0));
        }
        let params = parameters(&net);
        assert!(params.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert!(params.iter().any(|&v| v != 0.0));
        assert!((0..OUTPUT_LAYER_SIZE).all(|i| net.get_output(i) == 0.0));
    }

    #[test]
    fn same_seed_builds_same_network() {
        assert_eq!(network(9), network(9));
        assert_ne!(network(9), network(10));
    }

    #[test]
    fn rejects_sizes_off_the_lane_grid() {
        let mut rng = RandomSource::new(0);
        let err = Network::with_sizes(LayerSizes([4, 6, 8, 4]), &mut rng).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidLayerSize { layer: 1, size: 6 }));
        let err = Network::with_sizes(LayerSizes([0, 8, 8, 4]), &mut rng).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidLayerSize { layer: 0, size: 0 }));
    }

    #[test]
    fn set_input_writes_input_layer_only() {
        let mut net = network(4);
        net.set_input(2, 0.75);
        assert_eq!(net.values(INPUT_LAYER), &[0.0f32, 0.0, 0.75, 0.0]);
        assert!(net.outputs().iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "input index 4 out of range")]
    fn set_input_out_of_range_panics() {
        network(5).set_input(4, 1.0);
    }

    #[test]
    #[should_panic(expected = "output index 7 out of range")]
    fn get_output_out_of_range_panics() {
        network(5).get_output(7);
    }

    #[test]
    #[should_panic(expected = "wrong length")]
    fn set_inputs_checks_length() {
        network(5).set_inputs(&[1.0, 2.0]);
    }

    #[test]
    fn clone_is_deep_and_independent() {
        let mut rng = RandomSource::new(6);
        let mut original = Network::new(&mut rng).unwrap();
        original.set_inputs(&[0.1, 0.2, 0.3, 0.4]);
        original.process();

        let mut copy = original.try_clone().unwrap();
        assert_eq!(copy, original);

        copy.weights_mut(0)[0] = 42.0;
        copy.set_input(0, -3.0);
        assert_ne!(original.weights(0)[0], 42.0);
        assert_eq!(original.values(INPUT_LAYER)[0], 0.1);

        let before = original.clone();
        original.mutate(&mut rng);
        original.offsets_mut(2)[3] = 9.0;
        assert_eq!(copy.offsets(2)[3], before.offsets(2)[3]);
    }

    #[test]
    fn mutate_changes_exactly_one_scalar() {
        let mut rng = RandomSource::new(11);
        let mut net = Network::new(&mut rng).unwrap();
        for _ in 0..200 {
            let before = parameters(&net);
            let m = net.mutate(&mut rng);
            let after = parameters(&net);

            let changed = before.iter().zip(&after).filter(|(a, b)| a.to_bits() != b.to_bits()).count();
            let expected = usize::from(m.previous.to_bits() != m.value.to_bits());
            assert_eq!(changed, expected);

            let buf = match m.parameter {
                Parameter::Weight => net.weights(m.transition),
                Parameter::Offset => net.offsets(m.transition),
            };
            assert_eq!(buf[m.index], m.value);
            assert!((-1.0..=1.0).contains(&m.value));
        }
    }

    #[test]
    fn mutate_reaches_every_transition_and_both_parameters() {
        let mut rng = RandomSource::new(12);
        let mut net = Network::new(&mut rng).unwrap();
        let mut transitions = [false; TRANSITION_COUNT];
        let (mut weights, mut offsets) = (0, 0);
        for _ in 0..1_000 {
            let m = net.mutate(&mut rng);
            assert!(m.index < net.sizes().layer(m.transition + 1));
            transitions[m.transition] = true;
            match m.parameter {
                Parameter::Weight => weights += 1,
                Parameter::Offset => offsets += 1,
            }
        }
        assert!(transitions.iter().all(|&t| t));
        assert!(weights > 350 && offsets > 350, "coin looks biased: {weights}/{offsets}");
    }
}
