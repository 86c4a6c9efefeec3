use crate::pipeline::GpuVertex;

/// Growable vertex/index storage shared by every draw in a frame.
///
/// Capacity only grows, doubling until the frame fits, so a skeleton
/// that settles into a steady vertex count stops reallocating after
/// its first few frames.
pub struct MeshBuffer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
}

const INITIAL_VERTICES: usize = 1024;
const INITIAL_INDICES: usize = 2048;

impl MeshBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            vertex_buffer: create_vertex_buffer(device, INITIAL_VERTICES),
            index_buffer: create_index_buffer(device, INITIAL_INDICES),
            vertex_capacity: INITIAL_VERTICES,
            index_capacity: INITIAL_INDICES,
        }
    }

    /// Reallocates whichever buffer is too small for the frame.
    pub fn ensure(&mut self, device: &wgpu::Device, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity {
            while self.vertex_capacity < vertices {
                self.vertex_capacity *= 2;
            }
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
        }
        if indices > self.index_capacity {
            while self.index_capacity < indices {
                self.index_capacity *= 2;
            }
            self.index_buffer = create_index_buffer(device, self.index_capacity);
        }
    }

    /// Writes the frame's geometry from offset zero. The caller must
    /// have called [`ensure`](Self::ensure) first.
    pub fn upload(&self, queue: &wgpu::Queue, vertices: &[GpuVertex], indices: &[u32]) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(indices));
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("rig2d vertices"),
        size: (capacity * std::mem::size_of::<GpuVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("rig2d indices"),
        size: (capacity * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
