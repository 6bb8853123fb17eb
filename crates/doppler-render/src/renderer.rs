// Vulkano instance/device/swapchain. egui draws straight onto the swapchain
// images, so no render pass of our own is needed.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use vulkano::{
    device::{
        physical::{PhysicalDevice, PhysicalDeviceType},
        Device, DeviceCreateInfo, DeviceExtensions, Queue, QueueCreateInfo, QueueFlags,
    },
    image::{view::ImageView, Image, ImageUsage},
    instance::{Instance, InstanceCreateFlags, InstanceCreateInfo},
    swapchain::{self, Surface, Swapchain, SwapchainCreateInfo, SwapchainPresentInfo},
    sync::{self, GpuFuture},
    Validated, VulkanError, VulkanLibrary,
};
use winit::{dpi::LogicalSize, event_loop::ActiveEventLoop, window::Window};

pub const WINDOW_TITLE: &str = "Doppler Effect";

pub struct Renderer {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub surface: Arc<Surface>,
    pub swapchain: Arc<Swapchain>,
    pub image_views: Vec<Arc<ImageView>>,
    pub window: Arc<Window>,
    pub recreate_swapchain: bool,
    previous_frame_end: Option<Box<dyn GpuFuture>>,
}

impl Renderer {
    pub fn new(event_loop: &ActiveEventLoop) -> Result<Self> {
        let instance = create_instance(event_loop)?;

        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(WINDOW_TITLE)
                        .with_inner_size(LogicalSize::new(1120u32, 760u32)),
                )
                .map_err(|e| anyhow!("failed to create window: {e}"))?,
        );
        let surface = Surface::from_window(instance.clone(), window.clone())
            .map_err(|e| anyhow!("failed to create surface: {e}"))?;

        let device_extensions = DeviceExtensions {
            khr_swapchain: true,
            ..DeviceExtensions::empty()
        };
        let (physical_device, queue_family_index) =
            select_physical_device(&instance, &surface, &device_extensions)?;
        info!(
            "Using device: {} (type: {:?})",
            physical_device.properties().device_name,
            physical_device.properties().device_type,
        );

        let (device, mut queues) = Device::new(
            physical_device.clone(),
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index,
                    ..Default::default()
                }],
                enabled_extensions: device_extensions,
                ..Default::default()
            },
        )
        .context("failed to create logical device")?;
        let queue = queues.next().ok_or_else(|| anyhow!("no queue available"))?;

        let (swapchain, images) = create_swapchain(&physical_device, &device, &surface, &window)?;
        let image_views = image_views(&images)?;
        let previous_frame_end = Some(sync::now(device.clone()).boxed());

        Ok(Renderer {
            device,
            queue,
            surface,
            swapchain,
            image_views,
            window,
            recreate_swapchain: false,
            previous_frame_end,
        })
    }

    pub fn swapchain_format(&self) -> vulkano::format::Format {
        self.swapchain.image_format()
    }

    fn recreate_swapchain(&mut self) -> Result<()> {
        let window_size = self.window.inner_size();
        if window_size.width == 0 || window_size.height == 0 {
            // Minimised; try again once the window has an area.
            return Ok(());
        }
        let (new_swapchain, new_images) = self
            .swapchain
            .recreate(SwapchainCreateInfo {
                image_extent: [window_size.width, window_size.height],
                ..self.swapchain.create_info()
            })
            .context("failed to recreate swapchain")?;

        self.swapchain = new_swapchain;
        self.image_views = image_views(&new_images)?;
        self.recreate_swapchain = false;
        Ok(())
    }

    /// Acquire the next swapchain image. Returns `None` when this frame should
    /// be skipped (swapchain out of date or window minimised).
    pub fn begin_frame(&mut self) -> Result<Option<(u32, swapchain::SwapchainAcquireFuture)>> {
        if let Some(future) = self.previous_frame_end.as_mut() {
            future.cleanup_finished();
        }

        if self.recreate_swapchain {
            self.recreate_swapchain()?;
            if self.recreate_swapchain {
                return Ok(None);
            }
        }

        match swapchain::acquire_next_image(self.swapchain.clone(), None).map_err(Validated::unwrap) {
            Ok((image_index, suboptimal, acquire_future)) => {
                if suboptimal {
                    self.recreate_swapchain = true;
                }
                Ok(Some((image_index, acquire_future)))
            }
            Err(VulkanError::OutOfDate) => {
                self.recreate_swapchain = true;
                Ok(None)
            }
            Err(e) => Err(anyhow!("failed to acquire next image: {e}")),
        }
    }

    /// Future of the previous frame's GPU work, to join new work onto.
    pub fn take_previous_frame_end(&mut self) -> Box<dyn GpuFuture> {
        self.previous_frame_end
            .take()
            .unwrap_or_else(|| sync::now(self.device.clone()).boxed())
    }

    /// Present `image_index` once `after_future` completes.
    pub fn present(&mut self, after_future: Box<dyn GpuFuture>, image_index: u32) {
        let future = after_future
            .then_swapchain_present(
                self.queue.clone(),
                SwapchainPresentInfo::swapchain_image_index(self.swapchain.clone(), image_index),
            )
            .then_signal_fence_and_flush();

        let end = match future.map_err(Validated::unwrap) {
            Ok(future) => future.boxed(),
            Err(VulkanError::OutOfDate) => {
                self.recreate_swapchain = true;
                sync::now(self.device.clone()).boxed()
            }
            Err(e) => {
                warn!("Failed to flush frame: {e}");
                sync::now(self.device.clone()).boxed()
            }
        };
        self.previous_frame_end = Some(end);
    }
}

fn create_instance(event_loop: &ActiveEventLoop) -> Result<Arc<Instance>> {
    let library = VulkanLibrary::new().map_err(|e| anyhow!("no Vulkan library found: {e}"))?;
    let required_extensions = Surface::required_extensions(event_loop)
        .map_err(|e| anyhow!("failed to get required extensions: {e}"))?;
    Instance::new(
        library,
        InstanceCreateInfo {
            flags: InstanceCreateFlags::ENUMERATE_PORTABILITY,
            enabled_extensions: required_extensions,
            ..Default::default()
        },
    )
    .context("failed to create Vulkan instance")
}

/// Pick a device that can present to `surface`, preferring discrete GPUs.
fn select_physical_device(
    instance: &Arc<Instance>,
    surface: &Arc<Surface>,
    extensions: &DeviceExtensions,
) -> Result<(Arc<PhysicalDevice>, u32)> {
    instance
        .enumerate_physical_devices()
        .map_err(|e| anyhow!("failed to enumerate physical devices: {e}"))?
        .filter(|p| p.supported_extensions().contains(extensions))
        .filter_map(|p| {
            p.queue_family_properties()
                .iter()
                .enumerate()
                .position(|(i, q)| {
                    q.queue_flags.intersects(QueueFlags::GRAPHICS)
                        && p.surface_support(i as u32, surface).unwrap_or(false)
                })
                .map(|i| (p, i as u32))
        })
        .min_by_key(|(p, _)| match p.properties().device_type {
            PhysicalDeviceType::DiscreteGpu => 0,
            PhysicalDeviceType::IntegratedGpu => 1,
            PhysicalDeviceType::VirtualGpu => 2,
            PhysicalDeviceType::Cpu => 3,
            PhysicalDeviceType::Other => 4,
            _ => 5,
        })
        .ok_or_else(|| anyhow!("no suitable physical device found"))
}

fn create_swapchain(
    physical_device: &Arc<PhysicalDevice>,
    device: &Arc<Device>,
    surface: &Arc<Surface>,
    window: &Window,
) -> Result<(Arc<Swapchain>, Vec<Arc<Image>>)> {
    let capabilities = physical_device
        .surface_capabilities(surface, Default::default())
        .context("failed to query surface capabilities")?;
    let image_format = physical_device
        .surface_formats(surface, Default::default())
        .context("failed to query surface formats")?
        .first()
        .map(|(format, _)| *format)
        .ok_or_else(|| anyhow!("surface reports no formats"))?;
    let composite_alpha = capabilities
        .supported_composite_alpha
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no composite alpha mode"))?;
    let window_size = window.inner_size();

    Swapchain::new(
        device.clone(),
        surface.clone(),
        SwapchainCreateInfo {
            min_image_count: capabilities.min_image_count.max(2),
            image_format,
            image_extent: [window_size.width, window_size.height],
            image_usage: ImageUsage::COLOR_ATTACHMENT,
            composite_alpha,
            ..Default::default()
        },
    )
    .context("failed to create swapchain")
}

fn image_views(images: &[Arc<Image>]) -> Result<Vec<Arc<ImageView>>> {
    images
        .iter()
        .map(|image| ImageView::new_default(image.clone()).context("failed to create image view"))
        .collect()
}
